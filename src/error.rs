//! Validator-level error types shared across stores, caches, sessions, and the renewal client.

// self
use crate::_prelude::*;

/// Validator-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical validator error exposed by public APIs.
///
/// None of these are part of the per-request outcome taxonomy: rejections, missing records,
/// and an unreachable provider are turned into sign-in redirects by the validator. What
/// remains here are infrastructure failures the host application has to deal with.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Expiry cache failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Session backend failure while signing a user out.
	#[error("{0}")]
	Session(
		#[from]
		#[source]
		crate::session::SessionError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The identity provider could not be reached (timeout, DNS, TCP, TLS).
	#[error(transparent)]
	RemoteUnavailable(#[from] TransportError),
}

/// Configuration failures raised while talking to the provider.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Delegation request body could not be encoded.
	#[error("Delegation request body could not be encoded.")]
	RequestEncode(#[source] serde_json::Error),
	/// Delegation endpoint cannot be derived from the provider domain.
	#[error("Delegation endpoint for `{domain}` is not a valid URL.")]
	InvalidEndpoint {
		/// Provider domain the endpoint was derived from.
		domain: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Timeout cannot be represented as a transport timeout.
	#[error("The network timeout must be a positive duration.")]
	InvalidTimeout,
	/// Settings failed [`ValidatorConfig::validate`](crate::config::ValidatorConfig::validate).
	#[error(transparent)]
	Invalid(#[from] crate::config::ConfigBuildError),
	/// The renewal interval pushed a token expiry out of the representable range.
	#[error("Renewal interval overflows the token expiry.")]
	ExpiryOverflow,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO) reported while calling the delegation endpoint.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The request did not complete within the configured timeout.
	#[error("Delegation request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the delegation endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the delegation endpoint.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the delegation endpoint: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Returns `true` when the failure was a timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
