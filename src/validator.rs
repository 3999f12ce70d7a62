//! Per-request validation of a user's delegated id_token.
//!
//! [`Validator::validate`] runs the eligibility gate, asks the configured
//! [`ExpirationOracle`] whether the token is stale, renews it through the
//! [`DelegationClient`], and signs the user out when renewal is impossible. Every failure that
//! reaches the provider resolves to a [`SignInRedirect`]; only local infrastructure errors
//! (token store, session backend, invalid request encoding) surface as [`Error`].

mod eligibility;
mod metrics;

pub use eligibility::SkipReason;
pub use metrics::ValidationMetrics;

// self
use crate::{
	_prelude::*,
	auth::{IdToken, TokenRecord, UserId},
	clock::{self, Clock},
	config::ValidatorConfig,
	error::ConfigError,
	http::TokenHttpClient,
	obs::{self, CheckOutcome, CheckSpan},
	oracle::ExpirationOracle,
	renewal::{DelegationClient, RenewalResult},
	request::RequestContext,
	session::{Notice, SessionControl},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Validator specialized for the crate's default reqwest transport.
pub type ReqwestValidator = Validator<ReqwestHttpClient>;

/// Result of a check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
	/// The host should handle the request normally.
	Proceed(Proceed),
	/// The session was invalidated; the host should answer with this redirect.
	Redirect(SignInRedirect),
}
impl Verdict {
	/// Returns `true` when the request may proceed.
	pub fn is_proceed(&self) -> bool {
		matches!(self, Self::Proceed(_))
	}

	/// Returns the redirect, if the user was signed out.
	pub fn redirect(&self) -> Option<&SignInRedirect> {
		match self {
			Self::Redirect(redirect) => Some(redirect),
			Self::Proceed(_) => None,
		}
	}
}

/// Why a request may proceed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Proceed {
	/// The eligibility gate skipped the check.
	NotApplicable(SkipReason),
	/// The token is still fresh.
	Valid,
	/// The token was renewed during this request.
	Renewed,
}

/// Redirect produced by a forced sign-out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignInRedirect {
	/// Sign-in location the host should redirect to.
	pub location: String,
	/// Why the user was signed out.
	pub reason: LogoutReason,
}

/// Why a user was signed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
	/// The user is authenticated but has no id_token record.
	MissingTokenRecord,
	/// The provider could not be reached.
	RemoteUnavailable,
	/// The provider answered without a token.
	RenewalRejected,
}
impl LogoutReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LogoutReason::MissingTokenRecord => "missing_token_record",
			LogoutReason::RemoteUnavailable => "remote_unavailable",
			LogoutReason::RenewalRejected => "renewal_rejected",
		}
	}

	/// Returns the notice text configured for this reason.
	pub fn notice_text(self, config: &ValidatorConfig) -> &str {
		match self {
			LogoutReason::MissingTokenRecord => &config.notices.missing_record,
			LogoutReason::RemoteUnavailable => &config.notices.network_problem,
			LogoutReason::RenewalRejected => &config.notices.expired_session,
		}
	}

	fn outcome(self) -> CheckOutcome {
		match self {
			LogoutReason::MissingTokenRecord => CheckOutcome::MissingRecord,
			LogoutReason::RemoteUnavailable => CheckOutcome::Unavailable,
			LogoutReason::RenewalRejected => CheckOutcome::Rejected,
		}
	}
}
impl Display for LogoutReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request-time id_token validator.
///
/// The validator owns no per-request state; share one instance (typically behind an [`Arc`])
/// across every request handler. Concurrent checks for the same user may renew twice.
pub struct Validator<C>
where
	C: ?Sized + TokenHttpClient,
{
	config: ValidatorConfig,
	store: Arc<dyn TokenStore>,
	oracle: Arc<dyn ExpirationOracle>,
	renewer: DelegationClient<C>,
	clock: Arc<dyn Clock>,
	metrics: Arc<ValidationMetrics>,
}
impl<C> Validator<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a validator that reuses the caller-provided transport.
	///
	/// `config` is checked with [`ValidatorConfig::validate`] first, so deserialized settings
	/// get the same guarantees as built ones.
	pub fn with_http_client(
		config: ValidatorConfig,
		store: Arc<dyn TokenStore>,
		oracle: Arc<dyn ExpirationOracle>,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		config.validate().map_err(ConfigError::from)?;

		let renewer = DelegationClient::from_config(&config, http_client)?;

		Ok(Self {
			config,
			store,
			oracle,
			renewer,
			clock: clock::system(),
			metrics: Default::default(),
		})
	}

	/// Replaces the clock used to stamp renewed records.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Settings the validator was built from.
	pub fn config(&self) -> &ValidatorConfig {
		&self.config
	}

	/// Counters for checks, renewals, and forced sign-outs.
	pub fn metrics(&self) -> &ValidationMetrics {
		&self.metrics
	}

	/// Checks the request's user and renews or signs them out as needed.
	pub async fn validate(
		&self,
		request: &RequestContext,
		session: &dyn SessionControl,
	) -> Result<Verdict> {
		let user = match eligibility::check(&self.config, request) {
			Ok(user) => user.id.clone(),
			Err(reason) => {
				obs::record_check_outcome(CheckOutcome::Skipped);

				return Ok(Verdict::Proceed(Proceed::NotApplicable(reason)));
			},
		};
		let span = CheckSpan::new("validate");
		let result = span.instrument(self.check_user(&user, session)).await;
		let outcome = match &result {
			Ok(Verdict::Proceed(Proceed::Renewed)) => CheckOutcome::Renewed,
			Ok(Verdict::Proceed(_)) => CheckOutcome::Valid,
			Ok(Verdict::Redirect(redirect)) => redirect.reason.outcome(),
			Err(_) => CheckOutcome::Error,
		};

		obs::record_check_outcome(outcome);

		result
	}

	/// Invalidates the session, queues the notice for `reason`, and returns the redirect.
	///
	/// Notice failures are ignored; a failed logout is returned as an error because the user
	/// would otherwise stay signed in.
	pub async fn force_logout(
		&self,
		user: &UserId,
		session: &dyn SessionControl,
		reason: LogoutReason,
	) -> Result<SignInRedirect> {
		if let Err(e) = session.notify(Notice::error(reason.notice_text(&self.config))).await {
			obs::notice_dropped(user, &e);
		}

		session.logout().await?;
		self.metrics.record_logout();
		obs::forced_logout(user, reason);

		Ok(SignInRedirect { location: self.config.signin_url.clone(), reason })
	}

	async fn check_user(&self, user: &UserId, session: &dyn SessionControl) -> Result<Verdict> {
		self.metrics.record_check();

		if !self.oracle.is_expired(user).await? {
			return Ok(Verdict::Proceed(Proceed::Valid));
		}

		let Some(record) = self.store.load(user).await? else {
			return self.sign_out(user, session, LogoutReason::MissingTokenRecord).await;
		};

		match self.renewer.renew(&record.id_token).await {
			Ok(RenewalResult::Renewed(token)) => {
				self.store_renewal(record, token).await?;

				Ok(Verdict::Proceed(Proceed::Renewed))
			},
			Ok(RenewalResult::NoToken(_)) =>
				self.sign_out(user, session, LogoutReason::RenewalRejected).await,
			Err(Error::RemoteUnavailable(_)) =>
				self.sign_out(user, session, LogoutReason::RemoteUnavailable).await,
			Err(e) => Err(e),
		}
	}

	async fn store_renewal(&self, record: TokenRecord, token: IdToken) -> Result<()> {
		let expires_at = self
			.clock
			.now()
			.checked_add(self.config.renewal_interval)
			.ok_or(ConfigError::ExpiryOverflow)?;
		let renewed = record.renewed(token, expires_at);
		let user = renewed.user.clone();

		self.store.save(renewed).await?;
		self.oracle.record_renewed(&user).await?;
		self.metrics.record_renewal();
		obs::token_renewed(&user, expires_at);

		Ok(())
	}

	async fn sign_out(
		&self,
		user: &UserId,
		session: &dyn SessionControl,
		reason: LogoutReason,
	) -> Result<Verdict> {
		self.force_logout(user, session, reason).await.map(Verdict::Redirect)
	}
}
#[cfg(feature = "reqwest")]
impl Validator<ReqwestHttpClient> {
	/// Creates a validator that provisions its own reqwest transport.
	pub fn new(
		config: ValidatorConfig,
		store: Arc<dyn TokenStore>,
		oracle: Arc<dyn ExpirationOracle>,
	) -> Result<Self> {
		let http_client = ReqwestHttpClient::new()?;

		Self::with_http_client(config, store, oracle, http_client)
	}
}
impl<C> Debug for Validator<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Validator")
			.field("provider_domain", &self.config.provider_domain)
			.field("renewer", &self.renewer)
			.field("metrics", &self.metrics)
			.finish()
	}
}

