// self
use crate::{
	_prelude::*,
	auth::UserId,
	cache::ExpiryCache,
	config::ValidatorConfig,
	obs,
	oracle::{ExpirationOracle, OracleFuture},
};

/// Oracle that trusts a cache marker written after each successful renewal.
///
/// A live marker means "not expired"; anything else (miss, TTL elapsed, cache failure) means
/// "expired". Write failures are logged and ignored because the marker is only an optimization.
#[derive(Clone)]
pub struct CachedOracle {
	cache: Arc<dyn ExpiryCache>,
	ttl: Duration,
	key_prefix: String,
}
impl CachedOracle {
	/// Default prefix prepended to the user identifier to form cache keys.
	pub const DEFAULT_KEY_PREFIX: &'static str = "auth0:renew_id_token:";

	/// Creates an oracle whose markers live for `ttl` (the renewal interval).
	pub fn new(cache: Arc<dyn ExpiryCache>, ttl: Duration) -> Self {
		Self { cache, ttl, key_prefix: Self::DEFAULT_KEY_PREFIX.into() }
	}

	/// Creates an oracle using the renewal interval and key prefix from `config`.
	pub fn from_config(config: &ValidatorConfig, cache: Arc<dyn ExpiryCache>) -> Self {
		Self::new(cache, config.renewal_interval).with_key_prefix(config.cache_key_prefix.clone())
	}

	/// Overrides the cache key prefix.
	pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.key_prefix = prefix.into();

		self
	}

	/// Cache key used for `user`.
	pub fn cache_key(&self, user: &UserId) -> String {
		format!("{}{user}", self.key_prefix)
	}
}
impl Debug for CachedOracle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedOracle")
			.field("ttl", &self.ttl)
			.field("key_prefix", &self.key_prefix)
			.finish()
	}
}
impl ExpirationOracle for CachedOracle {
	fn is_expired<'a>(&'a self, user: &'a UserId) -> OracleFuture<'a, bool> {
		Box::pin(async move {
			let key = self.cache_key(user);

			match self.cache.contains(&key).await {
				Ok(live) => Ok(!live),
				Err(e) => {
					obs::cache_failure(user, "read", &e);

					Ok(true)
				},
			}
		})
	}

	fn record_renewed<'a>(&'a self, user: &'a UserId) -> OracleFuture<'a, ()> {
		Box::pin(async move {
			let key = self.cache_key(user);

			if let Err(e) = self.cache.insert(&key, self.ttl).await {
				obs::cache_failure(user, "write", &e);
			}

			Ok(())
		})
	}
}
