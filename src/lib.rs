//! Request-time identity token validator.
//!
//! Checks whether a user's delegated `id_token` is still fresh, renews it against the identity
//! provider, and signs the user out when renewal fails.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod oracle;
pub mod renewal;
pub mod request;
pub mod session;
pub mod store;
pub mod validator;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{IdToken, TokenRecord, UserId},
		clock::{Clock, ManualClock},
		config::ValidatorConfig,
		http::ReqwestHttpClient,
		oracle::{DirectOracle, ExpirationOracle},
		request::{RequestContext, UserContext},
		store::{MemoryStore, TokenStore},
		validator::Validator,
	};

	/// Validator type alias used by reqwest-backed integration tests.
	pub type ReqwestTestValidator = Validator<ReqwestHttpClient>;

	/// Fixed instant every test clock starts from.
	pub const TEST_EPOCH: OffsetDateTime = time::macros::datetime!(2025-01-01 12:00 UTC);

	/// Builds a config pointing the delegation call at `endpoint` (usually an `httpmock` URL).
	pub fn test_config(endpoint: &str) -> ValidatorConfig {
		ValidatorConfig::builder()
			.provider_domain("tenant.auth0.example.com")
			.client_id("client-under-test")
			.delegation_endpoint(
				Url::parse(endpoint).expect("Mock delegation endpoint should parse successfully."),
			)
			.callback_url(
				Url::parse("https://app.example.com/oidc/callback/?next=/")
					.expect("Callback URL fixture should parse successfully."),
			)
			.eligible_domain("example.com")
			.timeout(Duration::milliseconds(500))
			.renewal_interval(Duration::minutes(15))
			.build()
			.expect("Test validator config should be valid.")
	}

	/// Builds a reqwest HTTP client without connection pooling surprises between mock servers.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.pool_max_idle_per_host(0)
			.build()
			.expect("Failed to build Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`Validator`] backed by an in-memory store, the direct expiration oracle,
	/// a manual clock pinned at [`TEST_EPOCH`], and the reqwest transport.
	pub fn build_reqwest_test_validator(
		config: ValidatorConfig,
	) -> (ReqwestTestValidator, Arc<MemoryStore>, ManualClock) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let clock = ManualClock::new(TEST_EPOCH);
		let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
		let oracle: Arc<dyn ExpirationOracle> =
			Arc::new(DirectOracle::new(store.clone()).with_clock(shared_clock.clone()));
		let validator =
			Validator::with_http_client(config, store, oracle, test_reqwest_http_client())
				.expect("Test validator should build from a valid config.")
				.with_clock(shared_clock);

		(validator, store_backend, clock)
	}

	/// Seeds a record for `user` that expires at `expires_at`.
	pub async fn seed_record(
		store: &MemoryStore,
		user: &UserId,
		token: &str,
		expires_at: OffsetDateTime,
	) {
		store
			.save(TokenRecord::new(user.clone(), IdToken::new(token), expires_at))
			.await
			.expect("Failed to seed token record into the store.");
	}

	/// Builds a `GET` request for an active user with the provided email.
	pub fn authenticated_get(user: &UserId, email: &str, path: &str) -> RequestContext {
		RequestContext::get(path).with_user(UserContext::new(user.clone()).with_email(email))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
