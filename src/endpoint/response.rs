//! Access token responses and their conversion into stored tokens.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, BEARER_TOKEN_TYPE, RefreshToken, ScopeSet, TokenSecret},
	error::ConfigError,
};

/// Successful token endpoint response (RFC 6749 §5.1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessTokenResponse {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// Token type, usually `Bearer`.
	pub token_type: String,
	/// Lifetime relative to the time the response was received.
	pub expires_in: Option<Duration>,
	/// Refresh token, when issued.
	pub refresh_token: Option<TokenSecret>,
	/// Granted scopes; `None` means the requested scopes were granted.
	pub scopes: Option<ScopeSet>,
	/// RFC 8693 `issued_token_type`, for token exchange responses.
	pub issued_token_type: Option<String>,
}
impl AccessTokenResponse {
	/// Creates a bearer response without expiry or refresh token.
	pub fn new(access_token: impl Into<TokenSecret>) -> Self {
		Self {
			access_token: access_token.into(),
			token_type: BEARER_TOKEN_TYPE.into(),
			expires_in: None,
			refresh_token: None,
			scopes: None,
			issued_token_type: None,
		}
	}

	/// Sets the token type.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = token_type.into();

		self
	}

	/// Sets the lifetime.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_in = Some(expires_in);

		self
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(refresh_token.into());

		self
	}

	/// Sets the granted scopes.
	pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = Some(scopes);

		self
	}

	/// Sets the issued token type.
	pub fn with_issued_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.issued_token_type = Some(token_type.into());

		self
	}

	/// Builds the access token, falling back to `requested` when no scopes were returned.
	pub fn access_token_at(
		&self,
		issued_at: OffsetDateTime,
		requested: &ScopeSet,
	) -> Result<AccessToken, ConfigError> {
		let mut builder = AccessToken::builder()
			.value(self.access_token.expose())
			.token_type(self.token_type.as_str())
			.issued_at(issued_at)
			.scopes(self.scopes.clone().unwrap_or_else(|| requested.clone()));

		if let Some(expires_in) = self.expires_in {
			if !expires_in.is_positive() {
				return Err(ConfigError::NonPositiveExpiresIn);
			}
			if issued_at.checked_add(expires_in).is_none() {
				return Err(ConfigError::ExpiresInOutOfRange);
			}

			builder = builder.expires_in(expires_in);
		}

		Ok(builder.build()?)
	}

	/// Builds the refresh token, if one was issued.
	pub fn refresh_token_at(&self, issued_at: OffsetDateTime) -> Option<RefreshToken> {
		self.refresh_token
			.as_ref()
			.map(|token| RefreshToken::new(token.expose()).with_issued_at(issued_at))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn builds_tokens_with_fallback_scopes() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let requested = ScopeSet::new(["read"]).expect("Scope fixture should be valid.");
		let response = AccessTokenResponse::new("access")
			.with_expires_in(Duration::minutes(5))
			.with_refresh_token("refresh");
		let token = response.access_token_at(now, &requested).expect("Token should build.");

		assert_eq!(token.value.expose(), "access");
		assert_eq!(token.expires_at, Some(macros::datetime!(2025-01-01 00:05 UTC)));
		assert_eq!(token.scopes, requested);
		assert_eq!(
			response.refresh_token_at(now).map(|token| token.value.expose().to_owned()),
			Some("refresh".into())
		);
	}

	#[test]
	fn rejects_non_positive_lifetimes() {
		let response = AccessTokenResponse::new("access").with_expires_in(Duration::ZERO);
		let err = response
			.access_token_at(OffsetDateTime::now_utc(), &ScopeSet::default())
			.expect_err("Zero lifetime should be rejected.");

		assert!(matches!(err, ConfigError::NonPositiveExpiresIn));
	}

	#[test]
	fn unrepresentable_expiry_is_an_error() {
		let response =
			AccessTokenResponse::new("access").with_expires_in(Duration::seconds(400_000_000_000));
		let err = response
			.access_token_at(macros::datetime!(2025-01-01 00:00 UTC), &ScopeSet::default())
			.expect_err("An expiry past the representable range should be rejected.");

		assert!(matches!(err, ConfigError::ExpiresInOutOfRange));
	}
}
