//! Builder and validation rules for [`ValidatorConfig`].

// self
use crate::{
	_prelude::*,
	auth::{self, ClientId, IdentifierError},
	config::{AsyncRequestPolicy, LogoutNotices, ValidatorConfig},
	oracle::CachedOracle,
};

/// Errors raised while constructing or validating [`ValidatorConfig`] values.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigBuildError {
	/// Provider domain is required.
	#[error("Missing provider domain.")]
	MissingProviderDomain,
	/// Provider domain must be a bare host.
	#[error("Provider domain must be a bare host name: {domain}.")]
	InvalidProviderDomain {
		/// Rejected value.
		domain: String,
	},
	/// Client identifier is required.
	#[error("Missing client identifier.")]
	MissingClientId,
	/// Client identifier failed validation.
	#[error(transparent)]
	InvalidClientId(#[from] IdentifierError),
	/// Callback URL is required to exempt the login handshake.
	#[error("Missing provider callback URL.")]
	MissingCallbackUrl,
	/// Timeout must be positive.
	#[error("The network timeout must be positive.")]
	NonPositiveTimeout,
	/// Renewal interval must be positive.
	#[error("The token renewal interval must be positive.")]
	NonPositiveRenewalInterval,
	/// Renewal interval exceeds the supported maximum.
	#[error("The token renewal interval exceeds {max}.")]
	RenewalIntervalTooLarge {
		/// Largest accepted interval.
		max: Duration,
	},
	/// Sign-in location is required.
	#[error("The sign-in URL cannot be empty.")]
	EmptySigninUrl,
}

/// Builder for [`ValidatorConfig`] values.
#[derive(Debug)]
pub struct ValidatorConfigBuilder {
	/// Identity provider host.
	pub provider_domain: Option<String>,
	/// Raw client identifier.
	pub client_id: Option<String>,
	/// Optional delegation endpoint override.
	pub delegation_endpoint: Option<Url>,
	/// Network timeout for delegation requests.
	pub timeout: Duration,
	/// Lifetime granted to renewed tokens.
	pub renewal_interval: Duration,
	/// Redirect location after a forced sign-out.
	pub signin_url: String,
	/// Provider callback URL.
	pub callback_url: Option<Url>,
	/// Additional exempt paths.
	pub exempt_paths: BTreeSet<String>,
	/// Email domains subject to the check.
	pub eligible_domains: BTreeSet<String>,
	/// Methods treated as submissions.
	pub submission_methods: BTreeSet<String>,
	/// Treatment of asynchronous requests.
	pub async_requests: AsyncRequestPolicy,
	/// Cache key prefix.
	pub cache_key_prefix: String,
	/// Forced sign-out notice texts.
	pub notices: LogoutNotices,
}
impl ValidatorConfigBuilder {
	/// Default network timeout.
	pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(5);
	/// Default renewal interval.
	pub const DEFAULT_RENEWAL_INTERVAL: Duration = Duration::hours(1);
	/// Longest accepted renewal interval.
	pub const MAX_RENEWAL_INTERVAL: Duration = Duration::days(366);
	/// Default sign-in location.
	pub const DEFAULT_SIGNIN_URL: &'static str = "/login/";

	/// Creates a builder seeded with defaults.
	pub fn new() -> Self {
		Self {
			provider_domain: None,
			client_id: None,
			delegation_endpoint: None,
			timeout: Self::DEFAULT_TIMEOUT,
			renewal_interval: Self::DEFAULT_RENEWAL_INTERVAL,
			signin_url: Self::DEFAULT_SIGNIN_URL.into(),
			callback_url: None,
			exempt_paths: BTreeSet::new(),
			eligible_domains: BTreeSet::new(),
			submission_methods: BTreeSet::from(["POST".to_owned()]),
			async_requests: AsyncRequestPolicy::default(),
			cache_key_prefix: CachedOracle::DEFAULT_KEY_PREFIX.into(),
			notices: LogoutNotices::default(),
		}
	}

	/// Sets the provider domain.
	pub fn provider_domain(mut self, domain: impl Into<String>) -> Self {
		self.provider_domain = Some(domain.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Overrides the delegation endpoint.
	pub fn delegation_endpoint(mut self, url: Url) -> Self {
		self.delegation_endpoint = Some(url);

		self
	}

	/// Sets the network timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Sets the renewal interval.
	pub fn renewal_interval(mut self, interval: Duration) -> Self {
		self.renewal_interval = interval;

		self
	}

	/// Sets the sign-in redirect location.
	pub fn signin_url(mut self, url: impl Into<String>) -> Self {
		self.signin_url = url.into();

		self
	}

	/// Sets the provider callback URL.
	pub fn callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}

	/// Exempts an additional request path.
	pub fn exempt_path(mut self, path: impl Into<String>) -> Self {
		self.exempt_paths.insert(path.into());

		self
	}

	/// Adds a single eligible email domain.
	pub fn eligible_domain(mut self, domain: impl AsRef<str>) -> Self {
		self.eligible_domains.insert(auth::normalize_domain(domain.as_ref()));

		self
	}

	/// Adds multiple eligible email domains.
	pub fn eligible_domains<I, S>(mut self, domains: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for domain in domains.into_iter() {
			self = self.eligible_domain(domain);
		}

		self
	}

	/// Replaces the set of methods treated as form submissions.
	pub fn submission_methods<I, S>(mut self, methods: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.submission_methods =
			methods.into_iter().map(|method| method.as_ref().trim().to_ascii_uppercase()).collect();

		self
	}

	/// Overrides the asynchronous request policy.
	pub fn async_requests(mut self, policy: AsyncRequestPolicy) -> Self {
		self.async_requests = policy;

		self
	}

	/// Overrides the cache key prefix.
	pub fn cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.cache_key_prefix = prefix.into();

		self
	}

	/// Overrides the forced sign-out notice texts.
	pub fn notices(mut self, notices: LogoutNotices) -> Self {
		self.notices = notices;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<ValidatorConfig, ConfigBuildError> {
		let provider_domain =
			self.provider_domain.ok_or(ConfigBuildError::MissingProviderDomain)?;
		let client_id = ClientId::new(self.client_id.ok_or(ConfigBuildError::MissingClientId)?)?;
		let callback_url = self.callback_url.ok_or(ConfigBuildError::MissingCallbackUrl)?;
		let config = ValidatorConfig {
			provider_domain: provider_domain.trim().to_ascii_lowercase(),
			client_id,
			delegation_endpoint: self.delegation_endpoint,
			timeout: self.timeout,
			renewal_interval: self.renewal_interval,
			signin_url: self.signin_url,
			callback_url,
			exempt_paths: self.exempt_paths,
			eligible_domains: self.eligible_domains,
			submission_methods: self.submission_methods,
			async_requests: self.async_requests,
			cache_key_prefix: self.cache_key_prefix,
			notices: self.notices,
		};

		config.validate()?;

		Ok(config)
	}
}
impl Default for ValidatorConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ValidatorConfig {
	/// Validates invariants; deserialized configs should be checked with this before use.
	pub fn validate(&self) -> Result<(), ConfigBuildError> {
		validate_provider_domain(&self.provider_domain)?;

		if !self.timeout.is_positive() {
			return Err(ConfigBuildError::NonPositiveTimeout);
		}
		if !self.renewal_interval.is_positive() {
			return Err(ConfigBuildError::NonPositiveRenewalInterval);
		}
		if self.renewal_interval > ValidatorConfigBuilder::MAX_RENEWAL_INTERVAL {
			return Err(ConfigBuildError::RenewalIntervalTooLarge {
				max: ValidatorConfigBuilder::MAX_RENEWAL_INTERVAL,
			});
		}
		if self.signin_url.trim().is_empty() {
			return Err(ConfigBuildError::EmptySigninUrl);
		}

		Ok(())
	}
}

fn validate_provider_domain(domain: &str) -> Result<(), ConfigBuildError> {
	if domain.is_empty() {
		return Err(ConfigBuildError::MissingProviderDomain);
	}
	if domain.contains("://") || domain.contains('/') || domain.chars().any(char::is_whitespace) {
		return Err(ConfigBuildError::InvalidProviderDomain { domain: domain.to_owned() });
	}

	Ok(())
}
