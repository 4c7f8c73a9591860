//! Authorized clients: the tokens a principal holds for one registration.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, PrincipalName, RefreshToken, RegistrationId},
	registration::ClientRegistration,
};

/// Registration + principal + the tokens obtained for that principal.
///
/// Instances are never mutated; a refresh produces a new value that replaces the previous
/// one in the repository.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthorizedClient {
	/// Registration the tokens were obtained with.
	pub registration: Arc<ClientRegistration>,
	/// Name of the principal the tokens belong to.
	pub principal_name: PrincipalName,
	/// Current access token.
	pub access_token: AccessToken,
	/// Refresh token, when the authorization server issued one.
	pub refresh_token: Option<RefreshToken>,
}
impl AuthorizedClient {
	/// Creates an authorized client without a refresh token.
	pub fn new(
		registration: Arc<ClientRegistration>,
		principal_name: PrincipalName,
		access_token: AccessToken,
	) -> Self {
		Self { registration, principal_name, access_token, refresh_token: None }
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: RefreshToken) -> Self {
		self.refresh_token = Some(refresh_token);

		self
	}

	/// Identifier of the registration the client belongs to.
	pub fn registration_id(&self) -> &RegistrationId {
		&self.registration.registration_id
	}

	/// Returns `true` when the access token expired at `now` and a refresh token is present.
	pub fn is_refreshable_at(&self, now: OffsetDateTime, clock_skew: Duration) -> bool {
		self.refresh_token.is_some() && self.access_token.expires_within(now, clock_skew)
	}
}
