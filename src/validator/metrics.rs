// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for checks that got past the eligibility gate.
#[derive(Debug, Default)]
pub struct ValidationMetrics {
	checks: AtomicU64,
	renewals: AtomicU64,
	logouts: AtomicU64,
}
impl ValidationMetrics {
	/// Returns the number of checks that consulted the expiration oracle.
	pub fn checks(&self) -> u64 {
		self.checks.load(Ordering::Relaxed)
	}

	/// Returns the number of successful renewals.
	pub fn renewals(&self) -> u64 {
		self.renewals.load(Ordering::Relaxed)
	}

	/// Returns the number of forced sign-outs.
	pub fn logouts(&self) -> u64 {
		self.logouts.load(Ordering::Relaxed)
	}

	pub(crate) fn record_check(&self) {
		self.checks.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_renewal(&self) {
		self.renewals.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_logout(&self) {
		self.logouts.fetch_add(1, Ordering::Relaxed);
	}
}
