//! Authorized client providers, one per grant type, and the chain that selects among them.
//!
//! Providers form a closed set: [`AuthorizedClientProvider`] enumerates every supported grant
//! and each variant decides on its own whether it applies to an [`AuthorizationContext`].
//! The applicability rules are mutually exclusive for a well-formed chain: refresh only claims
//! contexts whose client holds a refresh token and an expired access token, while the other
//! grants only claim contexts where nothing usable exists (no client, or an expired one
//! without a refresh token) and the registration is configured for their grant.

pub mod authorization_code;
pub mod chain;
pub mod client_credentials;
pub mod jwt_bearer;
pub mod password;
pub mod refresh_token;
pub mod token_exchange;

pub use authorization_code::*;
pub use chain::*;
pub use client_credentials::*;
pub use jwt_bearer::*;
pub use password::*;
pub use refresh_token::*;
pub use token_exchange::*;

// self
use crate::{
	_prelude::*,
	auth::{RefreshToken, ScopeSet},
	client::AuthorizedClient,
	context::AuthorizationContext,
	endpoint::AccessTokenResponse,
	registration::GrantType,
};

/// Closed set of authorized client providers.
#[derive(Clone, Debug)]
pub enum AuthorizedClientProvider {
	/// Signals that interactive authorization is required.
	AuthorizationCode(AuthorizationCodeProvider),
	/// Refreshes expired access tokens.
	RefreshToken(RefreshTokenProvider),
	/// Obtains tokens as the client itself.
	ClientCredentials(ClientCredentialsProvider),
	/// Obtains tokens with resource owner credentials.
	Password(PasswordProvider),
	/// Obtains tokens with the principal's JWT as assertion.
	JwtBearer(JwtBearerProvider),
	/// Exchanges the principal's token for a new one.
	TokenExchange(TokenExchangeProvider),
}
impl AuthorizedClientProvider {
	/// Grant the provider handles.
	pub fn grant_type(&self) -> GrantType {
		match self {
			Self::AuthorizationCode(_) => GrantType::AuthorizationCode,
			Self::RefreshToken(_) => GrantType::RefreshToken,
			Self::ClientCredentials(_) => GrantType::ClientCredentials,
			Self::Password(_) => GrantType::Password,
			Self::JwtBearer(_) => GrantType::JwtBearer,
			Self::TokenExchange(_) => GrantType::TokenExchange,
		}
	}

	/// Returns `true` when the provider is responsible for `context` at `now`.
	pub fn applies(&self, context: &AuthorizationContext, now: OffsetDateTime) -> bool {
		match self {
			Self::AuthorizationCode(provider) => provider.applies(context, now),
			Self::RefreshToken(provider) => provider.applies(context, now),
			Self::ClientCredentials(provider) => provider.applies(context, now),
			Self::Password(provider) => provider.applies(context, now),
			Self::JwtBearer(provider) => provider.applies(context, now),
			Self::TokenExchange(provider) => provider.applies(context, now),
		}
	}

	/// Obtains a new authorized client for `context`.
	///
	/// Callers are expected to check [`applies`](Self::applies) first; a provider asked to
	/// authorize a context it cannot serve fails with
	/// [`Error::ClientAuthorizationRequired`].
	/// Issued tokens are stamped with `now`, the instant selection was evaluated at.
	pub async fn authorize(
		&self,
		context: &AuthorizationContext,
		now: OffsetDateTime,
	) -> Result<AuthorizedClient> {
		match self {
			Self::AuthorizationCode(provider) => provider.authorize(context),
			Self::RefreshToken(provider) => provider.authorize(context, now).await,
			Self::ClientCredentials(provider) => provider.authorize(context, now).await,
			Self::Password(provider) => provider.authorize(context, now).await,
			Self::JwtBearer(provider) => provider.authorize(context, now).await,
			Self::TokenExchange(provider) => provider.authorize(context, now).await,
		}
	}
}

macro_rules! impl_from_provider {
	($($provider:ident => $variant:ident),+ $(,)?) => {
		$(
			impl From<$provider> for AuthorizedClientProvider {
				fn from(provider: $provider) -> Self {
					Self::$variant(provider)
				}
			}
		)+
	};
}

impl_from_provider! {
	AuthorizationCodeProvider => AuthorizationCode,
	RefreshTokenProvider => RefreshToken,
	ClientCredentialsProvider => ClientCredentials,
	PasswordProvider => Password,
	JwtBearerProvider => JwtBearer,
	TokenExchangeProvider => TokenExchange,
}

/// Returns `true` when `context` targets `grant` and holds no usable token.
fn renewable(context: &AuthorizationContext, grant: GrantType, now: OffsetDateTime) -> bool {
	context.registration.uses(grant) && context.needs_new_authorization(now)
}

/// Builds the authorized client returned by a successful token exchange.
fn authorized_client(
	context: &AuthorizationContext,
	response: &AccessTokenResponse,
	requested: &ScopeSet,
	previous_refresh: Option<&RefreshToken>,
	issued_at: OffsetDateTime,
) -> Result<AuthorizedClient> {
	let access_token = response.access_token_at(issued_at, requested)?;
	let refresh_token = response.refresh_token_at(issued_at).or_else(|| previous_refresh.cloned());
	let client = AuthorizedClient {
		registration: context.registration.clone(),
		principal_name: context.principal.name.clone(),
		access_token,
		refresh_token,
	};

	Ok(client)
}
