//! Resource owner password credentials grant provider.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::AuthorizedClient,
	context::{AuthorizationContext, PASSWORD_ATTRIBUTE, USERNAME_ATTRIBUTE},
	endpoint::{PasswordGrantRequest, SharedTokenResponseClient},
	registration::GrantType,
};

/// Provider for the resource owner password credentials grant.
///
/// Credentials come from the `username` and `password` context attributes; the provider
/// does not apply unless both are present and non-blank.
#[derive(Clone)]
pub struct PasswordProvider {
	client: SharedTokenResponseClient<PasswordGrantRequest>,
}
impl PasswordProvider {
	/// Creates a provider that exchanges through `client`.
	pub fn new(client: SharedTokenResponseClient<PasswordGrantRequest>) -> Self {
		Self { client }
	}

	/// Applies to password registrations without a usable token when credentials are present.
	pub fn applies(&self, context: &AuthorizationContext, now: OffsetDateTime) -> bool {
		super::renewable(context, GrantType::Password, now) && credentials(context).is_some()
	}

	/// Exchanges the resource owner credentials for a token.
	pub async fn authorize(
		&self,
		context: &AuthorizationContext,
		now: OffsetDateTime,
	) -> Result<AuthorizedClient> {
		let Some((username, password)) = credentials(context) else {
			return Err(Error::client_authorization_required(
				context.registration.registration_id.clone(),
			));
		};
		let request = PasswordGrantRequest {
			registration: context.registration.clone(),
			username: username.to_owned(),
			password: TokenSecret::new(password),
		};
		let response = self.client.token_response(&request).await?;

		super::authorized_client(context, &response, &context.registration.scopes, None, now)
	}
}
impl Debug for PasswordProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PasswordProvider(..)")
	}
}

fn credentials(context: &AuthorizationContext) -> Option<(&str, &str)> {
	Some((context.attribute(USERNAME_ATTRIBUTE)?, context.attribute(PASSWORD_ATTRIBUTE)?))
}
