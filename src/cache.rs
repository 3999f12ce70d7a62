//! Minimal TTL key/value contract for the shared expiry cache.
//!
//! The validator never manages cache internals; it only asks whether a key is live and writes
//! presence markers with a time-to-live. Entries are advisory: a missing or failing cache
//! forces a renewal attempt, never a false "valid" answer.

pub mod memory;

pub use memory::MemoryCache;

// self
use crate::_prelude::*;

/// Boxed future returned by [`ExpiryCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Process-wide cache holding presence markers with a time-to-live.
pub trait ExpiryCache
where
	Self: Send + Sync,
{
	/// Returns `true` if `key` holds an entry that has not yet expired.
	fn contains<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool>;

	/// Writes a presence marker for `key` that expires after `ttl`.
	fn insert<'a>(&'a self, key: &'a str, ttl: Duration) -> CacheFuture<'a, ()>;
}

/// Error type produced by [`ExpiryCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Backend-level failure for the cache engine.
	#[error("Cache backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// The TTL cannot be added to the current instant.
	#[error("Cache TTL for `{key}` is out of range.")]
	TtlOutOfRange {
		/// Key whose marker could not be written.
		key: String,
	},
}
