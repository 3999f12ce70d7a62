//! Auth-domain identifiers, email helpers, and the persisted id_token record.

pub mod email;
pub mod id;
pub mod token;

pub use email::*;
pub use id::*;
pub use token::*;
