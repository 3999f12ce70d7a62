//! In-process [`ExpiryCache`] with clock-driven expiry.

// self
use crate::{
	_prelude::*,
	cache::{CacheError, CacheFuture, ExpiryCache},
	clock::{self, Clock},
};

type EntryMap = Arc<RwLock<HashMap<String, OffsetDateTime>>>;

/// Thread-safe TTL cache that keeps expiry instants in-process.
///
/// Expired entries are dropped lazily on lookup; call [`MemoryCache::purge_expired`] to sweep
/// the whole map.
#[derive(Clone)]
pub struct MemoryCache {
	entries: EntryMap,
	clock: Arc<dyn Clock>,
}
impl MemoryCache {
	/// Creates an empty cache driven by the system clock.
	pub fn new() -> Self {
		Self { entries: Default::default(), clock: clock::system() }
	}

	/// Replaces the clock used to evaluate TTLs.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Removes every expired entry and returns how many were dropped.
	pub fn purge_expired(&self) -> usize {
		let now = self.clock.now();
		let mut guard = self.entries.write();
		let before = guard.len();

		guard.retain(|_, expires_at| *expires_at > now);

		before - guard.len()
	}

	/// Number of entries currently held, including ones not yet purged.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns `true` when no entries are held.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	fn contains_now(&self, key: &str) -> bool {
		let now = self.clock.now();
		let current = self.entries.read().get(key).copied();

		match current {
			None => return false,
			Some(expires_at) if expires_at > now => return true,
			Some(_) => {},
		}

		let mut guard = self.entries.write();

		// Another writer may have refreshed the entry between the two locks.
		if guard.get(key).is_some_and(|expires_at| *expires_at <= now) {
			guard.remove(key);
		}

		guard.get(key).is_some()
	}

	fn insert_now(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
		if !ttl.is_positive() {
			self.entries.write().remove(key);

			return Ok(());
		}

		let expires_at = self
			.clock
			.now()
			.checked_add(ttl)
			.ok_or_else(|| CacheError::TtlOutOfRange { key: key.to_owned() })?;

		self.entries.write().insert(key.to_owned(), expires_at);

		Ok(())
	}
}
impl Default for MemoryCache {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for MemoryCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemoryCache").field("entries", &self.len()).finish()
	}
}
impl ExpiryCache for MemoryCache {
	fn contains<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
		Box::pin(async move { Ok(self.contains_now(key)) })
	}

	fn insert<'a>(&'a self, key: &'a str, ttl: Duration) -> CacheFuture<'a, ()> {
		Box::pin(async move { self.insert_now(key, ttl) })
	}
}
