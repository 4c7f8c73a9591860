//! Token exchange (RFC 8693) grant provider.

// self
use crate::{
	_prelude::*,
	auth::SubjectToken,
	client::AuthorizedClient,
	context::AuthorizationContext,
	endpoint::{SharedTokenResponseClient, TokenExchangeGrantRequest},
	registration::GrantType,
};

/// Resolves a subject or actor token from the authorization context.
pub type TokenResolver = Arc<dyn Fn(&AuthorizationContext) -> Option<SubjectToken> + Send + Sync>;

/// Provider for the RFC 8693 token exchange grant.
///
/// By default the subject token is the principal's credential (JWT or opaque access token)
/// and no actor token is sent.
#[derive(Clone)]
pub struct TokenExchangeProvider {
	client: SharedTokenResponseClient<TokenExchangeGrantRequest>,
	subject_token_resolver: TokenResolver,
	actor_token_resolver: Option<TokenResolver>,
}
impl TokenExchangeProvider {
	/// Creates a provider that exchanges through `client`.
	pub fn new(client: SharedTokenResponseClient<TokenExchangeGrantRequest>) -> Self {
		Self {
			client,
			subject_token_resolver: Arc::new(|context: &AuthorizationContext| {
				context.principal.subject_token()
			}),
			actor_token_resolver: None,
		}
	}

	/// Replaces the subject token resolver.
	pub fn with_subject_token_resolver(mut self, resolver: TokenResolver) -> Self {
		self.subject_token_resolver = resolver;

		self
	}

	/// Configures an actor token resolver.
	pub fn with_actor_token_resolver(mut self, resolver: TokenResolver) -> Self {
		self.actor_token_resolver = Some(resolver);

		self
	}

	/// Applies to token_exchange registrations without a usable token when a subject token
	/// resolves.
	pub fn applies(&self, context: &AuthorizationContext, now: OffsetDateTime) -> bool {
		super::renewable(context, GrantType::TokenExchange, now)
			&& (self.subject_token_resolver)(context).is_some()
	}

	/// Exchanges the resolved subject (and actor) token.
	pub async fn authorize(
		&self,
		context: &AuthorizationContext,
		now: OffsetDateTime,
	) -> Result<AuthorizedClient> {
		let Some(subject_token) = (self.subject_token_resolver)(context) else {
			return Err(Error::client_authorization_required(
				context.registration.registration_id.clone(),
			));
		};
		let actor_token = self.actor_token_resolver.as_ref().and_then(|resolve| resolve(context));
		let request = TokenExchangeGrantRequest {
			registration: context.registration.clone(),
			subject_token,
			actor_token,
		};
		let response = self.client.token_response(&request).await?;

		super::authorized_client(context, &response, &context.registration.scopes, None, now)
	}
}
impl Debug for TokenExchangeProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchangeProvider")
			.field("actor_token_resolver", &self.actor_token_resolver.is_some())
			.finish()
	}
}
