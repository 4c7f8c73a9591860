//! Refresh token model.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Refresh token issued alongside an access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
	/// Token value; callers must avoid logging it.
	pub value: TokenSecret,
	/// Instant the token was issued, when known.
	pub issued_at: Option<OffsetDateTime>,
}
impl RefreshToken {
	/// Wraps a refresh token value.
	pub fn new(value: impl Into<String>) -> Self {
		Self { value: TokenSecret::new(value), issued_at: None }
	}

	/// Records the issued-at instant.
	pub fn with_issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}
}
impl Debug for RefreshToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshToken")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.finish()
	}
}
