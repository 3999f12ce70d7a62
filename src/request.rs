//! Explicit per-request inputs handed to the validator by the host framework.

// self
use crate::{_prelude::*, auth::UserId};

/// Identity attached to the incoming request by the host's authentication layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserContext {
	/// Authenticated user.
	pub id: UserId,
	/// Email on the account, if any.
	pub email: Option<String>,
	/// Whether the account is active.
	pub is_active: bool,
}
impl UserContext {
	/// Creates an active user without an email address.
	pub fn new(id: UserId) -> Self {
		Self { id, email: None, is_active: true }
	}

	/// Sets the account email.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Overrides the active flag.
	pub fn with_active(mut self, active: bool) -> Self {
		self.is_active = active;

		self
	}

	/// Non-empty email, if any.
	pub fn email(&self) -> Option<&str> {
		self.email.as_deref().filter(|email| !email.trim().is_empty())
	}
}

/// Request data the eligibility gate inspects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
	/// HTTP method (case-insensitive).
	pub method: String,
	/// Request path without query string.
	pub path: String,
	/// Whether the request was issued by client-side code (XHR/fetch).
	pub is_async: bool,
	/// Authenticated user, or `None` for anonymous requests.
	pub user: Option<UserContext>,
}
impl RequestContext {
	/// Creates an anonymous request.
	pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
		Self { method: method.into(), path: path.into(), is_async: false, user: None }
	}

	/// Shorthand for an anonymous `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new("GET", path)
	}

	/// Attaches the authenticated user.
	pub fn with_user(mut self, user: UserContext) -> Self {
		self.user = Some(user);

		self
	}

	/// Marks the request as asynchronous.
	pub fn with_async(mut self, is_async: bool) -> Self {
		self.is_async = is_async;

		self
	}

	/// Derives the async flag from an `X-Requested-With` header value.
	pub fn with_requested_with(self, header: Option<&str>) -> Self {
		let is_async = header.is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"));

		self.with_async(is_async)
	}
}
