//! Immutable access token model, lifecycle helpers, and builder.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
};

/// Token type most authorization servers issue.
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// Current lifecycle status for an access token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is not yet valid because the issued-at instant is in the future.
	Pending,
	/// Token is currently valid.
	Active,
	/// Token reached its expiry instant.
	Expired,
}

/// Errors produced by [`AccessTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum AccessTokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token value is required.")]
	MissingValue,
	/// Issued when the expiry precedes the issued-at instant.
	#[error("Access token expires before it was issued.")]
	ExpiresBeforeIssued,
	/// Issued when `issued_at + expires_in` is not a representable instant.
	#[error("Access token expiry is out of range.")]
	ExpiryOutOfRange,
}

/// Access token issued to an authorized client.
///
/// A token without `expires_at` carries no expiry information and is never considered
/// expired; the refresh provider therefore never claims it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Token type reported by the token endpoint (usually `Bearer`).
	pub token_type: String,
	/// Token value; callers must avoid logging it.
	pub value: TokenSecret,
	/// Instant the token was issued (or received).
	pub issued_at: OffsetDateTime,
	/// Expiry instant, when the token endpoint reported one.
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes granted to the token.
	pub scopes: ScopeSet,
}
impl AccessToken {
	/// Returns a builder seeded with the `Bearer` token type.
	pub fn builder() -> AccessTokenBuilder {
		AccessTokenBuilder::default()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant < self.issued_at {
			return TokenStatus::Pending;
		}

		match self.expires_at {
			Some(expires_at) if instant >= expires_at => TokenStatus::Expired,
			_ => TokenStatus::Active,
		}
	}

	/// Returns `true` if the token has expired at the provided instant (`now >= expires_at`).
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Returns `true` if the token expires within `skew` of the provided instant.
	///
	/// A zero skew is the exact `now >= expires_at` comparison.
	pub fn expires_within(&self, instant: OffsetDateTime, skew: Duration) -> bool {
		self.expires_at.is_some_and(|expires_at| instant + skew >= expires_at)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("token_type", &self.token_type)
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("scopes", &self.scopes)
			.finish()
	}
}

/// Builder for [`AccessToken`].
#[derive(Clone, Debug)]
pub struct AccessTokenBuilder {
	token_type: String,
	value: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	scopes: ScopeSet,
}
impl Default for AccessTokenBuilder {
	fn default() -> Self {
		Self {
			token_type: BEARER_TOKEN_TYPE.into(),
			value: None,
			issued_at: None,
			expires_at: None,
			expires_in: None,
			scopes: ScopeSet::default(),
		}
	}
}
impl AccessTokenBuilder {
	/// Provides the token value.
	pub fn value(mut self, token: impl Into<String>) -> Self {
		self.value = Some(TokenSecret::new(token));

		self
	}

	/// Overrides the token type.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = token_type.into();

		self
	}

	/// Sets the issued-at instant (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Sets the granted scopes.
	pub fn scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = scopes;

		self
	}

	/// Consumes the builder and produces an [`AccessToken`].
	pub fn build(self) -> Result<AccessToken, AccessTokenBuilderError> {
		let value = self.value.ok_or(AccessTokenBuilderError::MissingValue)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => Some(instant),
			(None, Some(delta)) => Some(
				issued_at.checked_add(delta).ok_or(AccessTokenBuilderError::ExpiryOutOfRange)?,
			),
			(None, None) => None,
		};

		if expires_at.is_some_and(|instant| instant < issued_at) {
			return Err(AccessTokenBuilderError::ExpiresBeforeIssued);
		}

		Ok(AccessToken { token_type: self.token_type, value, issued_at, expires_at, scopes: self.scopes })
	}
}
