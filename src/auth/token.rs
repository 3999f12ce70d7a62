//! Delegated id_token secret and the per-user record persisted by token stores.

// self
use crate::{_prelude::*, auth::UserId};

/// Redacted id_token wrapper keeping provider credentials out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdToken(String);
impl IdToken {
	/// Wraps a raw id_token issued by the identity provider.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the provider handed back an empty string.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for IdToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("IdToken").field(&"<redacted>").finish()
	}
}
impl Display for IdToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Delegated identity record owned by a single user.
///
/// Stores keep at most one record per [`UserId`]. The token and its expiry only change
/// together, through [`TokenRecord::renewed`] followed by a single store write.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
	/// Owning user.
	pub user: UserId,
	/// Current id_token; callers must avoid logging it.
	pub id_token: IdToken,
	/// Instant after which the token must be renewed.
	pub expires_at: OffsetDateTime,
}
impl TokenRecord {
	/// Creates a record for `user`.
	pub fn new(user: UserId, id_token: IdToken, expires_at: OffsetDateTime) -> Self {
		Self { user, id_token, expires_at }
	}

	/// Returns `true` once `instant` is strictly past the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at < instant
	}

	/// Produces the replacement record after a successful renewal.
	pub fn renewed(&self, id_token: IdToken, expires_at: OffsetDateTime) -> Self {
		Self { user: self.user.clone(), id_token, expires_at }
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("user", &self.user)
			.field("id_token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
