//! JWT bearer (RFC 7523) grant provider using the principal's JWT as assertion.

// self
use crate::{
	_prelude::*,
	client::AuthorizedClient,
	context::AuthorizationContext,
	endpoint::{JwtBearerGrantRequest, SharedTokenResponseClient},
	registration::GrantType,
};

/// Provider for the JWT bearer assertion grant; the principal's JWT is the assertion.
#[derive(Clone)]
pub struct JwtBearerProvider {
	client: SharedTokenResponseClient<JwtBearerGrantRequest>,
}
impl JwtBearerProvider {
	/// Creates a provider that exchanges through `client`.
	pub fn new(client: SharedTokenResponseClient<JwtBearerGrantRequest>) -> Self {
		Self { client }
	}

	/// Applies to jwt_bearer registrations without a usable token for JWT principals.
	pub fn applies(&self, context: &AuthorizationContext, now: OffsetDateTime) -> bool {
		super::renewable(context, GrantType::JwtBearer, now) && context.principal.jwt().is_some()
	}

	/// Presents the principal's JWT as the assertion.
	pub async fn authorize(
		&self,
		context: &AuthorizationContext,
		now: OffsetDateTime,
	) -> Result<AuthorizedClient> {
		let Some(jwt) = context.principal.jwt() else {
			return Err(Error::client_authorization_required(
				context.registration.registration_id.clone(),
			));
		};
		let request =
			JwtBearerGrantRequest { registration: context.registration.clone(), jwt: jwt.clone() };
		let response = self.client.token_response(&request).await?;

		super::authorized_client(context, &response, &context.registration.scopes, None, now)
	}
}
impl Debug for JwtBearerProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("JwtBearerProvider(..)")
	}
}
