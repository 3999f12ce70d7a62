//! Expiration oracles answering "does this user's id_token need renewal?".
//!
//! Two interchangeable strategies are provided:
//!
//! - [`DirectOracle`] reads the authoritative [`TokenRecord`](crate::auth::TokenRecord) from the
//!   token store on every check.
//! - [`CachedOracle`] consults a shared [`ExpiryCache`](crate::cache::ExpiryCache) instead and is
//!   only refreshed after successful renewals. A cold or evicted cache therefore reports
//!   "expired" and triggers a redundant but harmless renewal.
//!
//! The validator holds an `Arc<dyn ExpirationOracle>`, so the strategy is chosen once when the
//! validator is assembled.

mod cached;
mod direct;

pub use cached::*;
pub use direct::*;

// self
use crate::{_prelude::*, auth::UserId};

/// Boxed future returned by [`ExpirationOracle`] operations.
pub type OracleFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Strategy contract consulted by the validator before any renewal.
pub trait ExpirationOracle
where
	Self: Send + Sync,
{
	/// Returns `true` when the user's id_token must be renewed.
	fn is_expired<'a>(&'a self, user: &'a UserId) -> OracleFuture<'a, bool>;

	/// Updates any bookkeeping after the record for `user` was renewed and saved.
	fn record_renewed<'a>(&'a self, user: &'a UserId) -> OracleFuture<'a, ()>;
}
