//! Validated identifiers for registrations and principals.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Error returned when an identifier fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// Nothing but whitespace (or nothing at all) was supplied.
	#[error("{kind} identifier must not be blank.")]
	Empty {
		/// Kind of identifier (registration, principal).
		kind: &'static str,
	},
	/// Whitespace appeared in an identifier that forbids it.
	#[error("{kind} identifier must not contain whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (registration, principal).
		kind: &'static str,
	},
	/// The identifier is longer than its kind allows.
	#[error("{kind} identifier is longer than {max} bytes.")]
	TooLong {
		/// Kind of identifier (registration, principal).
		kind: &'static str,
		/// Maximum permitted length in bytes.
		max: usize,
	},
}

/// Constraints an identifier kind enforces.
#[derive(Clone, Copy, Debug)]
struct Rule {
	kind: &'static str,
	max_len: usize,
	allows_inner_whitespace: bool,
}
impl Rule {
	fn check(self, value: &str) -> Result<(), IdentifierError> {
		let kind = self.kind;

		if value.trim().is_empty() {
			Err(IdentifierError::Empty { kind })
		} else if value.len() > self.max_len {
			Err(IdentifierError::TooLong { kind, max: self.max_len })
		} else if self.allows_inner_whitespace {
			Ok(())
		} else if value.contains(char::is_whitespace) {
			Err(IdentifierError::ContainsWhitespace { kind })
		} else {
			Ok(())
		}
	}
}

// Registration ids appear in URLs and store keys.
const REGISTRATION: Rule = Rule { kind: "Registration", max_len: 128, allows_inner_whitespace: false };
// Display names such as "Jane Doe" are legitimate principal names.
const PRINCIPAL: Rule = Rule { kind: "Principal", max_len: 512, allows_inner_whitespace: true };

macro_rules! def_id {
	($(#[$meta:meta])* $name:ident => $rule:expr) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates `value` and wraps it.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				$rule.check(&value)?;

				Ok(Self(value))
			}

			/// Borrowed view of the identifier.
			pub fn as_str(&self) -> &str {
				&self.0
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
			fn from(id: $name) -> Self {
				id.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				self.as_str()
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				self.as_str()
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				self.as_str()
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple($rule.kind).field(&self.0).finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

def_id! {
	/// Identifier of a client registration (e.g. `google`).
	RegistrationId => REGISTRATION
}
def_id! {
	/// Name of the principal on whose behalf clients are authorized.
	PrincipalName => PRINCIPAL
}
