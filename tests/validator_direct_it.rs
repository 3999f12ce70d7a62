// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use id_token_validator::{
	_preludet::*,
	auth::UserId,
	error::ConfigError,
	session::{MemorySession, NoticeLevel},
	store::{MemoryStore, TokenStore},
	validator::{LogoutReason, Proceed, SkipReason, Verdict},
};

const DELEGATION_PATH: &str = "/delegation";

fn user() -> UserId {
	UserId::new("42").expect("User identifier fixture should be valid.")
}

async fn stored_token(store: &MemoryStore, user: &UserId) -> (String, OffsetDateTime) {
	let record = store
		.load(user)
		.await
		.expect("Loading from the memory store should succeed.")
		.expect("Record should remain present after the check.");

	(record.id_token.expose().to_owned(), record.expires_at)
}

#[tokio::test]
async fn expired_token_is_renewed_without_redirect() {
	let server = MockServer::start_async().await;
	let (validator, store, _clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let user = user();

	seed_record(&store, &user, "stale-token", TEST_EPOCH - Duration::minutes(1)).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH).json_body(json!({
				"client_id": "client-under-test",
				"api_type": "app",
				"grant_type": "urn:ietf:params:oauth:grant-type:jwt-bearer",
				"id_token": "stale-token",
			}));
			then.status(200).json_body(json!({ "id_token": "new", "token_type": "Bearer" }));
		})
		.await;
	let verdict = validator
		.validate(&authenticated_get(&user, "alice@example.com", "/dashboard/"), &session)
		.await
		.expect("Renewal check should succeed.");

	mock.assert_async().await;

	assert_eq!(verdict, Verdict::Proceed(Proceed::Renewed));
	assert_eq!(
		stored_token(&store, &user).await,
		("new".to_owned(), TEST_EPOCH + Duration::minutes(15))
	);
	assert!(!session.is_logged_out());
	assert!(session.notices().is_empty());
	assert_eq!(validator.metrics().renewals(), 1);
}

#[tokio::test]
async fn fresh_token_makes_no_remote_call() {
	let server = MockServer::start_async().await;
	let (validator, store, _clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let user = user();

	seed_record(&store, &user, "fresh-token", TEST_EPOCH + Duration::minutes(5)).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH);
			then.status(200).json_body(json!({ "id_token": "unexpected" }));
		})
		.await;
	let verdict = validator
		.validate(&authenticated_get(&user, "alice@example.com", "/"), &session)
		.await
		.expect("Fresh token check should succeed.");

	mock.assert_calls_async(0).await;

	assert_eq!(verdict, Verdict::Proceed(Proceed::Valid));
	assert_eq!(stored_token(&store, &user).await.0, "fresh-token");
}

#[tokio::test]
async fn renewal_timeout_signs_out_with_network_notice() {
	let server = MockServer::start_async().await;
	let (validator, store, _clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let user = user();

	seed_record(&store, &user, "stale-token", TEST_EPOCH - Duration::minutes(1)).await;

	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH);
			then.status(200)
				.delay(StdDuration::from_secs(2))
				.json_body(json!({ "id_token": "too-late" }));
		})
		.await;
	let verdict = validator
		.validate(&authenticated_get(&user, "alice@example.com", "/"), &session)
		.await
		.expect("A timed out renewal should resolve to a redirect.");
	let redirect = verdict.redirect().expect("Timed out renewal should redirect to sign-in.");

	assert_eq!(redirect.reason, LogoutReason::RemoteUnavailable);
	assert_eq!(redirect.location, "/login/");
	assert!(session.is_logged_out());

	let notices = session.notices();

	assert_eq!(notices.len(), 1);
	assert_eq!(notices[0].level, NoticeLevel::Error);
	assert!(notices[0].message.contains("network problem"));
	assert_eq!(stored_token(&store, &user).await.0, "stale-token");
}

#[tokio::test]
async fn empty_response_signs_out_with_expired_session_notice() {
	let server = MockServer::start_async().await;
	let (validator, store, _clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let user = user();

	seed_record(&store, &user, "stale-token", TEST_EPOCH - Duration::minutes(1)).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH);
			then.status(200).json_body(json!({}));
		})
		.await;
	let verdict = validator
		.validate(&authenticated_get(&user, "alice@example.com", "/"), &session)
		.await
		.expect("A declined renewal should resolve to a redirect.");

	mock.assert_async().await;

	assert_eq!(
		verdict.redirect().map(|redirect| redirect.reason),
		Some(LogoutReason::RenewalRejected)
	);
	assert!(session.is_logged_out());
	assert!(
		session
			.notices()
			.iter()
			.any(|notice| notice.message.contains("expired authentication session"))
	);
	assert_eq!(stored_token(&store, &user).await.0, "stale-token");
	assert_eq!(validator.metrics().logouts(), 1);
}

#[tokio::test]
async fn gateway_error_page_is_treated_as_rejection() {
	let server = MockServer::start_async().await;
	let (validator, store, _clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let user = user();

	seed_record(&store, &user, "stale-token", TEST_EPOCH - Duration::minutes(1)).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH);
			then.status(502).header("content-type", "text/html").body("<h1>Bad Gateway</h1>");
		})
		.await;
	let verdict = validator
		.validate(&authenticated_get(&user, "alice@example.com", "/"), &session)
		.await
		.expect("A malformed response should resolve to a redirect.");

	mock.assert_async().await;

	assert_eq!(
		verdict.redirect().map(|redirect| redirect.reason),
		Some(LogoutReason::RenewalRejected)
	);
	assert!(session.is_logged_out());
}

#[tokio::test]
async fn missing_record_signs_out_with_provider_notice() {
	let server = MockServer::start_async().await;
	let (validator, _store, _clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH);
			then.status(200).json_body(json!({ "id_token": "unexpected" }));
		})
		.await;
	let verdict = validator
		.validate(&authenticated_get(&user(), "alice@example.com", "/"), &session)
		.await
		.expect("A missing record should resolve to a redirect.");

	mock.assert_calls_async(0).await;

	assert_eq!(
		verdict.redirect().map(|redirect| redirect.reason),
		Some(LogoutReason::MissingTokenRecord)
	);
	assert!(session.is_logged_out());
	assert!(session.notices().iter().any(|notice| notice.message.contains("provider")));
	assert!(!session.notices().iter().any(|notice| notice.message.contains("network problem")));
}

#[tokio::test]
async fn ineligible_requests_have_no_side_effects() {
	let server = MockServer::start_async().await;
	let (validator, store, _clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let user = user();

	seed_record(&store, &user, "stale-token", TEST_EPOCH - Duration::days(1)).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH);
			then.status(200).json_body(json!({ "id_token": "unexpected" }));
		})
		.await;
	let mut post = authenticated_get(&user, "alice@example.com", "/profile/");

	post.method = "POST".into();

	let cases = [
		(authenticated_get(&user, "alice@partner.net", "/"), SkipReason::DomainNotEligible),
		(authenticated_get(&user, "alice@example.com", "/oidc/callback/"), SkipReason::ExemptPath),
		(
			authenticated_get(&user, "alice@example.com", "/api/")
				.with_requested_with(Some("XMLHttpRequest")),
			SkipReason::AsyncRequest,
		),
		(post, SkipReason::SubmissionMethod),
	];

	for (request, reason) in cases {
		let verdict = validator
			.validate(&request, &session)
			.await
			.expect("Ineligible requests should never fail.");

		assert_eq!(verdict, Verdict::Proceed(Proceed::NotApplicable(reason)));
	}

	mock.assert_calls_async(0).await;

	assert!(!session.is_logged_out());
	assert!(session.notices().is_empty());
	assert_eq!(stored_token(&store, &user).await.0, "stale-token");
	assert_eq!(validator.metrics().checks(), 0);
}

#[tokio::test]
async fn renewed_record_stays_valid_until_interval_elapses() {
	let server = MockServer::start_async().await;
	let (validator, store, clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let user = user();
	let request = authenticated_get(&user, "alice@example.com", "/");

	seed_record(&store, &user, "stale-token", TEST_EPOCH).await;
	clock.advance(Duration::seconds(1));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH);
			then.status(200).json_body(json!({ "id_token": "rotated" }));
		})
		.await;

	for _ in 0..3 {
		validator.validate(&request, &session).await.expect("Check should succeed.");
	}

	mock.assert_calls_async(1).await;
	clock.advance(Duration::minutes(15) + Duration::seconds(1));

	let verdict = validator.validate(&request, &session).await.expect("Check should succeed.");

	assert_eq!(verdict, Verdict::Proceed(Proceed::Renewed));

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn expiry_beyond_the_calendar_is_an_error() {
	let server = MockServer::start_async().await;
	let (validator, store, clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let user = user();
	let near_limit = time::macros::datetime!(9999-12-31 23:50 UTC);

	clock.set(near_limit);
	seed_record(&store, &user, "stale-token", near_limit - Duration::minutes(1)).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH);
			then.status(200).json_body(json!({ "id_token": "new" }));
		})
		.await;
	let err = validator
		.validate(&authenticated_get(&user, "alice@example.com", "/"), &session)
		.await
		.expect_err("An unrepresentable expiry should fail the check.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Config(ConfigError::ExpiryOverflow)));
	assert_eq!(stored_token(&store, &user).await.0, "stale-token");
	assert!(!session.is_logged_out());
	assert_eq!(validator.metrics().renewals(), 0);
}

#[tokio::test]
async fn array_body_is_rejected_instead_of_renewed() {
	let server = MockServer::start_async().await;
	let (validator, store, _clock) =
		build_reqwest_test_validator(test_config(&server.url(DELEGATION_PATH)));
	let session = MemorySession::default();
	let user = user();

	seed_record(&store, &user, "stale-token", TEST_EPOCH - Duration::minutes(1)).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DELEGATION_PATH);
			then.status(200).json_body(json!(["forged"]));
		})
		.await;
	let verdict = validator
		.validate(&authenticated_get(&user, "alice@example.com", "/"), &session)
		.await
		.expect("Array bodies should resolve to a redirect.");

	mock.assert_async().await;

	assert_eq!(
		verdict.redirect().map(|redirect| redirect.reason),
		Some(LogoutReason::RenewalRejected)
	);
	assert_eq!(stored_token(&store, &user).await.0, "stale-token");
	assert!(session.is_logged_out());
}
