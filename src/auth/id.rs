//! Validated identifiers for application users and the provider client.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const MAX_IDENTIFIER_BYTES: usize = 256;

macro_rules! def_id {
	($(#[$meta:meta])* $name:ident => $kind:literal) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates `value` and wraps it.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				check($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}({})", $kind, self.0)
			}
		}
	};
}

def_id! {
	/// Primary key of the application user owning an id_token record.
	UserId => "user"
}
def_id! {
	/// Client identifier registered with the identity provider.
	ClientId => "client"
}

impl From<u64> for UserId {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

/// Rejection raised when an identifier fails validation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// Nothing but whitespace, or nothing at all.
	#[error("The {kind} identifier is blank.")]
	Blank {
		/// Identifier kind.
		kind: &'static str,
	},
	/// Whitespace or control characters are never part of an identifier.
	#[error("The {kind} identifier contains {character:?}.")]
	IllegalCharacter {
		/// Identifier kind.
		kind: &'static str,
		/// First offending character.
		character: char,
	},
	/// Longer than the storage layer accepts.
	#[error("The {kind} identifier is {len} bytes long; the limit is {max}.")]
	TooLong {
		/// Identifier kind.
		kind: &'static str,
		/// Actual length in bytes.
		len: usize,
		/// Limit in bytes.
		max: usize,
	},
}

fn check(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	if value.trim().is_empty() {
		return Err(IdentifierError::Blank { kind });
	}
	if let Some(character) = value.chars().find(|c| c.is_whitespace() || c.is_control()) {
		return Err(IdentifierError::IllegalCharacter { kind, character });
	}
	if value.len() > MAX_IDENTIFIER_BYTES {
		return Err(IdentifierError::TooLong { kind, len: value.len(), max: MAX_IDENTIFIER_BYTES });
	}

	Ok(())
}
