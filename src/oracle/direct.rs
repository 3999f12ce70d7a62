// self
use crate::{
	_prelude::*,
	auth::UserId,
	clock::{self, Clock},
	oracle::{ExpirationOracle, OracleFuture},
	store::TokenStore,
};

/// Oracle that derives expiry from the stored record on every request.
///
/// A user without a record is reported as expired.
#[derive(Clone)]
pub struct DirectOracle {
	store: Arc<dyn TokenStore>,
	clock: Arc<dyn Clock>,
}
impl DirectOracle {
	/// Creates an oracle reading from `store` with the system clock.
	pub fn new(store: Arc<dyn TokenStore>) -> Self {
		Self { store, clock: clock::system() }
	}

	/// Replaces the clock used for expiry comparisons.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}
}
impl Debug for DirectOracle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("DirectOracle(..)")
	}
}
impl ExpirationOracle for DirectOracle {
	fn is_expired<'a>(&'a self, user: &'a UserId) -> OracleFuture<'a, bool> {
		Box::pin(async move {
			let record = self.store.load(user).await?;

			Ok(record.is_none_or(|record| record.is_expired_at(self.clock.now())))
		})
	}

	fn record_renewed<'a>(&'a self, _user: &'a UserId) -> OracleFuture<'a, ()> {
		// The saved record already carries the new expiry.
		Box::pin(async { Ok(()) })
	}
}
