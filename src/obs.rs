//! Optional observability helpers for request-time checks.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `id_token_validator.check` with a `stage` field, plus
//!   debug/warn events for renewals, forced sign-outs, and degraded caches.
//! - Enable `metrics` to increment the `id_token_validator_check_total` counter for every
//!   finished check, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Terminal outcome labels recorded for each check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckOutcome {
	/// The eligibility gate skipped the request.
	Skipped,
	/// The token was still fresh.
	Valid,
	/// The token was renewed.
	Renewed,
	/// The provider declined renewal; the user was signed out.
	Rejected,
	/// The provider was unreachable; the user was signed out.
	Unavailable,
	/// No token record existed; the user was signed out.
	MissingRecord,
	/// An infrastructure error was returned to the host.
	Error,
}
impl CheckOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CheckOutcome::Skipped => "skipped",
			CheckOutcome::Valid => "valid",
			CheckOutcome::Renewed => "renewed",
			CheckOutcome::Rejected => "rejected",
			CheckOutcome::Unavailable => "unavailable",
			CheckOutcome::MissingRecord => "missing_record",
			CheckOutcome::Error => "error",
		}
	}
}
impl Display for CheckOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
