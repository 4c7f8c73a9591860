//! Provider that defers authorization_code registrations to the interactive redirect flow.

// self
use crate::{
	_prelude::*, client::AuthorizedClient, context::AuthorizationContext,
	registration::GrantType,
};

/// Provider for registrations using the interactive authorization_code grant.
///
/// Tokens for this grant can only be obtained after the user agent was redirected to the
/// authorization endpoint, so the provider never calls a token endpoint itself. It reports
/// [`Error::ClientAuthorizationRequired`] and the caller starts the redirect with
/// [`AuthorizationCodeSession`](crate::authorization_code::AuthorizationCodeSession).
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthorizationCodeProvider;
impl AuthorizationCodeProvider {
	/// Applies to authorization_code registrations holding no usable token: no authorized
	/// client, or one whose access token expired without a refresh token.
	pub fn applies(&self, context: &AuthorizationContext, now: OffsetDateTime) -> bool {
		super::renewable(context, GrantType::AuthorizationCode, now)
	}

	/// Always fails with [`Error::ClientAuthorizationRequired`].
	pub fn authorize(&self, context: &AuthorizationContext) -> Result<AuthorizedClient> {
		Err(Error::client_authorization_required(context.registration.registration_id.clone()))
	}
}
