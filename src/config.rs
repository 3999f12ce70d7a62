//! Validator configuration consumed (never owned) by the request-time check.
//!
//! Values are usually deserialized from the host application's settings or assembled through
//! [`ValidatorConfig::builder`], which validates them the same way
//! [`ValidatorConfig::validate`] does.

/// Builder API and validation rules for validator settings.
pub mod builder;

pub use builder::*;

// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	auth::{self, ClientId},
	error::ConfigError,
};

/// How asynchronous (XHR/fetch) requests are treated by the eligibility gate.
///
/// Skipping keeps client-side code from receiving sign-in redirects it cannot follow, at the
/// cost of single-page apps never renewing through background calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncRequestPolicy {
	#[default]
	/// Asynchronous requests bypass the check entirely.
	Skip,
	/// Asynchronous requests are checked like any other request.
	Validate,
}

/// User-facing texts attached to the notice emitted before a forced sign-out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoutNotices {
	/// Shown when an authenticated user has no id_token record.
	pub missing_record: String,
	/// Shown when the provider could not be reached.
	pub network_problem: String,
	/// Shown when the provider declined to renew the token.
	pub expired_session: String,
}
impl Default for LogoutNotices {
	fn default() -> Self {
		Self {
			missing_record: "You can't log in with that email address using the provider you \
			                 used. Please log in with the correct sign-in provider."
				.into(),
			network_problem: "Unable to validate your authentication with the identity \
			                  provider. This can happen when there is a temporary network \
			                  problem. Please sign in again."
				.into(),
			expired_session: "Unable to validate your authentication with the identity \
			                  provider. This is most likely due to an expired authentication \
			                  session. Please sign in again."
				.into(),
		}
	}
}

/// Immutable validator settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
	/// Identity provider host, e.g. `tenant.auth0.com`.
	pub provider_domain: String,
	/// Client identifier sent with every delegation request.
	pub client_id: ClientId,
	/// Overrides the `https://<provider_domain>/delegation` endpoint.
	#[serde(default)]
	pub delegation_endpoint: Option<Url>,
	/// Upper bound for a single delegation request.
	pub timeout: Duration,
	/// Lifetime granted to a renewed token, also used as the cache TTL.
	pub renewal_interval: Duration,
	/// Location users are redirected to after a forced sign-out.
	pub signin_url: String,
	/// Provider callback URL; its path is exempt from the check.
	pub callback_url: Url,
	/// Additional request paths exempt from the check.
	#[serde(default)]
	pub exempt_paths: BTreeSet<String>,
	/// Email domains subject to the check; lower-cased when deserialized.
	#[serde(deserialize_with = "deserialize_domains")]
	pub eligible_domains: BTreeSet<String>,
	/// Upper-cased HTTP methods treated as form submissions and skipped.
	pub submission_methods: BTreeSet<String>,
	/// Treatment of asynchronous requests.
	#[serde(default)]
	pub async_requests: AsyncRequestPolicy,
	/// Prefix used for expiry cache keys.
	pub cache_key_prefix: String,
	/// Texts for forced sign-out notices.
	#[serde(default)]
	pub notices: LogoutNotices,
}
impl ValidatorConfig {
	/// Creates a new builder seeded with defaults.
	pub fn builder() -> ValidatorConfigBuilder {
		ValidatorConfigBuilder::new()
	}

	/// Resolves the delegation endpoint.
	pub fn delegation_url(&self) -> Result<Url, ConfigError> {
		if let Some(endpoint) = &self.delegation_endpoint {
			return Ok(endpoint.clone());
		}

		Url::parse(&format!("https://{}/delegation", self.provider_domain)).map_err(|source| {
			ConfigError::InvalidEndpoint { domain: self.provider_domain.clone(), source }
		})
	}

	/// Path component of the callback URL.
	pub fn callback_path(&self) -> &str {
		self.callback_url.path()
	}

	/// Returns `true` when `path` must never trigger the check.
	pub fn is_exempt_path(&self, path: &str) -> bool {
		path == self.callback_path() || self.exempt_paths.contains(path)
	}

	/// Returns `true` when `method` is configured as a form submission.
	pub fn is_submission_method(&self, method: &str) -> bool {
		self.submission_methods.iter().any(|m| m.eq_ignore_ascii_case(method))
	}

	/// Returns `true` when users of `email` are subject to the check.
	///
	/// Configured domains are matched case-insensitively, whether or not they went through the
	/// builder.
	pub fn is_eligible_email(&self, email: &str) -> bool {
		let Some(domain) = auth::email_domain(email) else {
			return false;
		};

		self.eligible_domains.contains(&domain)
			|| self.eligible_domains.iter().any(|allowed| auth::normalize_domain(allowed) == domain)
	}
}

fn deserialize_domains<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let domains = <Vec<String>>::deserialize(deserializer)?;

	Ok(domains.iter().map(|domain| auth::normalize_domain(domain)).collect())
}
