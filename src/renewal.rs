//! Delegation client that exchanges a current id_token for a renewed one.
//!
//! A single `POST` is made per call with the configured timeout; retries are deliberately left
//! to callers. The response is read leniently: anything that is not a JSON object carrying a
//! non-empty `id_token` counts as "no token", because gateways answer transient failures with
//! HTML error pages and the caller signs the user out either way.

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest,
	http::{
		Method,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{ClientId, IdToken},
	config::ValidatorConfig,
	error::ConfigError,
	http::{ResponseMetadataSlot, TokenHttpClient},
	obs,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const API_TYPE: &str = "app";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Outcome of a delegation call that reached the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenewalResult {
	/// The provider issued a fresh id_token.
	Renewed(IdToken),
	/// The provider answered without a token.
	NoToken(NoTokenReason),
}
impl RenewalResult {
	/// Returns the renewed token, if any.
	pub fn token(&self) -> Option<&IdToken> {
		match self {
			Self::Renewed(token) => Some(token),
			Self::NoToken(_) => None,
		}
	}
}

/// Why a delegation response carried no token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoTokenReason {
	/// The body was not a JSON object (e.g. a gateway error page).
	Malformed {
		/// HTTP status code of the response.
		status: Option<u16>,
	},
	/// The body was JSON without a usable `id_token` (e.g. the user is blocked).
	Declined {
		/// HTTP status code of the response.
		status: Option<u16>,
		/// Provider `error` code, when present.
		error: Option<String>,
	},
}

#[derive(Serialize)]
struct DelegationRequest<'a> {
	client_id: &'a str,
	api_type: &'static str,
	grant_type: &'static str,
	id_token: &'a str,
}

type ResponseObject = serde_json::Map<String, Value>;

/// Client for the provider's `/delegation` endpoint.
pub struct DelegationClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	http_client: Arc<C>,
	endpoint: Url,
	client_id: ClientId,
	timeout: StdDuration,
}
impl<C> DelegationClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a client from the endpoint, client identifier, and timeout in `config`.
	pub fn from_config(config: &ValidatorConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let timeout =
			StdDuration::try_from(config.timeout).map_err(|_| ConfigError::InvalidTimeout)?;

		if timeout.is_zero() {
			return Err(ConfigError::InvalidTimeout.into());
		}

		Ok(Self {
			http_client: http_client.into(),
			endpoint: config.delegation_url()?,
			client_id: config.client_id.clone(),
			timeout,
		})
	}

	/// Endpoint the client posts to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Exchanges `id_token` for a renewed token.
	///
	/// Transport failures (timeouts included) surface as [`Error::RemoteUnavailable`]; every
	/// response that reached the client resolves to a [`RenewalResult`].
	pub async fn renew(&self, id_token: &IdToken) -> Result<RenewalResult> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone(), self.timeout);
		let request = self.build_request(id_token)?;
		let response =
			handle.call(request).await.map_err(|e| self.http_client.map_transport_error(e))?;
		let status = meta
			.take()
			.and_then(|meta| meta.status)
			.or_else(|| Some(response.status().as_u16()));

		Ok(parse_response(response.body(), status))
	}

	fn build_request(&self, id_token: &IdToken) -> Result<HttpRequest> {
		let body = serde_json::to_vec(&DelegationRequest {
			client_id: &self.client_id,
			api_type: API_TYPE,
			grant_type: JWT_BEARER_GRANT,
			id_token: id_token.expose(),
		})
		.map_err(ConfigError::RequestEncode)?;
		let request = oauth2::http::Request::builder()
			.method(Method::POST)
			.uri(self.endpoint.as_str())
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json")
			.body(body)
			.map_err(ConfigError::from)?;

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl DelegationClient<ReqwestHttpClient> {
	/// Creates a client backed by a fresh reqwest transport.
	pub fn new(config: &ValidatorConfig) -> Result<Self> {
		Self::from_config(config, ReqwestHttpClient::new()?)
	}
}
impl<C> Debug for DelegationClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DelegationClient")
			.field("endpoint", &self.endpoint.as_str())
			.field("client_id", &self.client_id)
			.field("timeout", &self.timeout)
			.finish()
	}
}

fn parse_response(body: &[u8], status: Option<u16>) -> RenewalResult {
	let mut de = serde_json::Deserializer::from_slice(body);
	// Only a JSON object is accepted; arrays and scalars are malformed.
	let mut object: ResponseObject = match serde_path_to_error::deserialize(&mut de) {
		Ok(object) => object,
		Err(e) => {
			obs::malformed_response(status, &e.path().to_string());

			return RenewalResult::NoToken(NoTokenReason::Malformed { status });
		},
	};

	match object.remove("id_token") {
		Some(Value::String(token)) if !token.is_empty() =>
			RenewalResult::Renewed(IdToken::new(token)),
		_ => {
			let error = object.remove("error").filter(|error| !error.is_null()).map(|error| {
				match error {
					Value::String(code) => code,
					other => other.to_string(),
				}
			});

			obs::renewal_declined(status, error.as_deref());

			RenewalResult::NoToken(NoTokenReason::Declined { status, error })
		},
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_field_yields_renewed() {
		let result = parse_response(br#"{"id_token":"fresh","token_type":"Bearer"}"#, Some(200));

		assert_eq!(result.token().map(IdToken::expose), Some("fresh"));
	}

	#[test]
	fn missing_or_empty_token_is_declined() {
		assert_eq!(
			parse_response(b"{}", Some(200)),
			RenewalResult::NoToken(NoTokenReason::Declined { status: Some(200), error: None })
		);
		assert_eq!(
			parse_response(br#"{"id_token":""}"#, Some(200)),
			RenewalResult::NoToken(NoTokenReason::Declined { status: Some(200), error: None })
		);
		assert_eq!(
			parse_response(br#"{"error":"unauthorized","error_description":"user is blocked"}"#, Some(401)),
			RenewalResult::NoToken(NoTokenReason::Declined {
				status: Some(401),
				error: Some("unauthorized".into()),
			})
		);
	}

	#[test]
	fn non_json_bodies_are_malformed() {
		assert_eq!(
			parse_response(b"<html>502 Bad Gateway</html>", Some(502)),
			RenewalResult::NoToken(NoTokenReason::Malformed { status: Some(502) })
		);
		assert_eq!(
			parse_response(b"", Some(504)),
			RenewalResult::NoToken(NoTokenReason::Malformed { status: Some(504) })
		);
		assert_eq!(
			parse_response(b"[\"id_token\"]", Some(200)),
			RenewalResult::NoToken(NoTokenReason::Malformed { status: Some(200) })
		);
	}

	#[test]
	fn sequences_and_scalars_never_renew() {
		let bodies: [&[u8]; 5] =
			[br#"["forged"]"#, br#"["forged", null]"#, br#""forged""#, b"42", b"null"];

		for body in bodies {
			assert_eq!(
				parse_response(body, Some(200)),
				RenewalResult::NoToken(NoTokenReason::Malformed { status: Some(200) }),
				"Body {:?} should be malformed.",
				String::from_utf8_lossy(body)
			);
		}
	}

	#[test]
	fn non_string_token_is_declined() {
		assert_eq!(
			parse_response(br#"{"id_token":42,"error":null}"#, Some(200)),
			RenewalResult::NoToken(NoTokenReason::Declined { status: Some(200), error: None })
		);
	}

	#[test]
	fn request_body_matches_delegation_contract() {
		let body = serde_json::to_value(DelegationRequest {
			client_id: "client",
			api_type: API_TYPE,
			grant_type: JWT_BEARER_GRANT,
			id_token: "current",
		})
		.expect("Delegation request should serialize.");

		assert_eq!(
			body,
			serde_json::json!({
				"client_id": "client",
				"api_type": "app",
				"grant_type": "urn:ietf:params:oauth:grant-type:jwt-bearer",
				"id_token": "current",
			})
		);
	}
}
