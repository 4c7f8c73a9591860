//! client_credentials grant provider.

// self
use crate::{
	_prelude::*,
	client::AuthorizedClient,
	context::AuthorizationContext,
	endpoint::{ClientCredentialsGrantRequest, SharedTokenResponseClient},
	registration::GrantType,
};

/// Provider for the client_credentials grant.
///
/// Every applicable call performs one exchange; reuse of a still-valid token comes from the
/// manager handing the stored client back in the context, which makes the provider inapplicable.
#[derive(Clone)]
pub struct ClientCredentialsProvider {
	client: SharedTokenResponseClient<ClientCredentialsGrantRequest>,
}
impl ClientCredentialsProvider {
	/// Creates a provider that exchanges through `client`.
	pub fn new(client: SharedTokenResponseClient<ClientCredentialsGrantRequest>) -> Self {
		Self { client }
	}

	/// Applies to client_credentials registrations without a usable token.
	pub fn applies(&self, context: &AuthorizationContext, now: OffsetDateTime) -> bool {
		super::renewable(context, GrantType::ClientCredentials, now)
	}

	/// Requests a token with the registration's scopes.
	pub async fn authorize(
		&self,
		context: &AuthorizationContext,
		now: OffsetDateTime,
	) -> Result<AuthorizedClient> {
		let request = ClientCredentialsGrantRequest { registration: context.registration.clone() };
		let response = self.client.token_response(&request).await?;

		super::authorized_client(context, &response, &context.registration.scopes, None, now)
	}
}
impl Debug for ClientCredentialsProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ClientCredentialsProvider(..)")
	}
}
