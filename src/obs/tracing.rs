// self
use crate::{_prelude::*, auth::UserId, validator::LogoutReason};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCheck<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCheck<F> = F;

/// A span builder used by the validator.
#[derive(Clone, Debug)]
pub struct CheckSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CheckSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("id_token_validator.check", stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCheck<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

pub(crate) fn token_renewed(user: &UserId, expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%user, %expires_at, "id_token renewed");
	#[cfg(not(feature = "tracing"))]
	let _ = (user, expires_at);
}

pub(crate) fn forced_logout(user: &UserId, reason: LogoutReason) {
	#[cfg(feature = "tracing")]
	tracing::warn!(%user, reason = reason.as_str(), "signing user out");
	#[cfg(not(feature = "tracing"))]
	let _ = (user, reason);
}

pub(crate) fn notice_dropped(user: &UserId, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%user, %error, "failed to queue sign-out notice");
	#[cfg(not(feature = "tracing"))]
	let _ = (user, error);
}

pub(crate) fn cache_failure(user: &UserId, operation: &'static str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(%user, operation, %error, "expiry cache unavailable");
	#[cfg(not(feature = "tracing"))]
	let _ = (user, operation, error);
}

pub(crate) fn renewal_declined(status: Option<u16>, error: Option<&str>) {
	#[cfg(feature = "tracing")]
	tracing::debug!(?status, ?error, "delegation response carried no id_token");
	#[cfg(not(feature = "tracing"))]
	let _ = (status, error);
}

pub(crate) fn malformed_response(status: Option<u16>, path: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(?status, path, "delegation response is not a JSON object");
	#[cfg(not(feature = "tracing"))]
	let _ = (status, path);
}
