//! Storage contracts and built-in store implementations for per-user id_token records.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{TokenRecord, UserId},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for delegated id_token records.
///
/// Implementations keep at most one record per user and must apply [`TokenStore::save`] as a
/// single replacement so readers never observe a new token paired with a stale expiry.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Fetches the record owned by `user`, if present.
	fn load<'a>(&'a self, user: &'a UserId) -> StoreFuture<'a, Option<TokenRecord>>;

	/// Persists or replaces the record for `record.user`.
	fn save(&self, record: TokenRecord) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
