//! Request-scoped session hooks used to force a sign-out.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::_prelude::*;

/// Boxed future returned by [`SessionControl`] operations.
pub type SessionFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, SessionError>> + 'a + Send>>;

/// Host-provided handle to the current request's session.
///
/// The validator calls [`SessionControl::notify`] before [`SessionControl::logout`] so hosts
/// that keep flash messages in the session can carry the notice over to the sign-in page.
pub trait SessionControl
where
	Self: Send + Sync,
{
	/// Queues a user-visible notice. Failures are ignored by the validator.
	fn notify(&self, notice: Notice) -> SessionFuture<'_, ()>;

	/// Invalidates the session so subsequent requests are unauthenticated.
	fn logout(&self) -> SessionFuture<'_, ()>;
}

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
	/// Informational message.
	Info,
	/// Error message.
	Error,
}

/// Flash-style message shown to the user on their next page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
	/// Severity.
	pub level: NoticeLevel,
	/// Text shown to the user.
	pub message: String,
}
impl Notice {
	/// Creates an error notice.
	pub fn error(message: impl Into<String>) -> Self {
		Self { level: NoticeLevel::Error, message: message.into() }
	}
}

/// Error type produced by [`SessionControl`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionError {
	/// Backend-level failure for the session engine.
	#[error("Session backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// In-memory session that records notices and the logout flag, for tests and demos.
#[derive(Debug, Default)]
pub struct MemorySession {
	notices: Mutex<Vec<Notice>>,
	logged_out: AtomicBool,
}
impl MemorySession {
	/// Returns `true` once [`SessionControl::logout`] ran.
	pub fn is_logged_out(&self) -> bool {
		self.logged_out.load(Ordering::Acquire)
	}

	/// Snapshot of the queued notices.
	pub fn notices(&self) -> Vec<Notice> {
		self.notices.lock().clone()
	}
}
impl SessionControl for MemorySession {
	fn notify(&self, notice: Notice) -> SessionFuture<'_, ()> {
		Box::pin(async move {
			self.notices.lock().push(notice);

			Ok(())
		})
	}

	fn logout(&self) -> SessionFuture<'_, ()> {
		Box::pin(async move {
			self.logged_out.store(true, Ordering::Release);

			Ok(())
		})
	}
}
