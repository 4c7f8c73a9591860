//! Grant request payloads, one struct per grant type.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Jwt, RefreshToken, ScopeSet, SubjectToken, TokenSecret},
	registration::{ClientRegistration, GrantType},
};

/// Common view over every grant request.
pub trait AuthorizationGrantRequest
where
	Self: Send + Sync,
{
	/// Grant the request belongs to.
	const GRANT_TYPE: GrantType;

	/// Registration the request is sent for.
	fn registration(&self) -> &Arc<ClientRegistration>;
}

macro_rules! impl_grant_request {
	($($name:ident => $variant:ident),+ $(,)?) => {
		$(
			impl AuthorizationGrantRequest for $name {
				const GRANT_TYPE: GrantType = GrantType::$variant;

				fn registration(&self) -> &Arc<ClientRegistration> {
					&self.registration
				}
			}
			impl From<$name> for GrantRequest {
				fn from(request: $name) -> Self {
					GrantRequest::$variant(request)
				}
			}
		)+

		/// Any grant request, used when requests of different grants need a common type.
		#[derive(Clone, Debug)]
		pub enum GrantRequest {
			$(
				#[allow(missing_docs)]
				$variant($name),
			)+
		}
		impl GrantRequest {
			/// Grant of the wrapped request.
			pub fn grant_type(&self) -> GrantType {
				match self {
					$(GrantRequest::$variant(_) => GrantType::$variant,)+
				}
			}

			/// Registration of the wrapped request.
			pub fn registration(&self) -> &Arc<ClientRegistration> {
				match self {
					$(GrantRequest::$variant(request) => request.registration(),)+
				}
			}
		}
	};
}

impl_grant_request! {
	AuthorizationCodeGrantRequest => AuthorizationCode,
	RefreshTokenGrantRequest => RefreshToken,
	ClientCredentialsGrantRequest => ClientCredentials,
	PasswordGrantRequest => Password,
	JwtBearerGrantRequest => JwtBearer,
	TokenExchangeGrantRequest => TokenExchange,
}

/// Authorization code exchange (RFC 6749 §4.1.3).
#[derive(Clone, Debug)]
pub struct AuthorizationCodeGrantRequest {
	/// Registration the code was issued to.
	pub registration: Arc<ClientRegistration>,
	/// Authorization code returned on the redirect.
	pub code: TokenSecret,
	/// Redirect URI used in the authorization request.
	pub redirect_uri: Url,
	/// PKCE verifier paired with the challenge sent in the authorization request.
	pub code_verifier: Option<TokenSecret>,
}

/// Refresh token grant (RFC 6749 §6).
#[derive(Clone, Debug)]
pub struct RefreshTokenGrantRequest {
	/// Registration of the client being refreshed.
	pub registration: Arc<ClientRegistration>,
	/// Access token being replaced.
	pub access_token: AccessToken,
	/// Refresh token presented to the token endpoint.
	pub refresh_token: RefreshToken,
	/// Scopes to request; empty keeps the originally granted scopes.
	pub scopes: ScopeSet,
}

/// Client credentials grant (RFC 6749 §4.4).
#[derive(Clone, Debug)]
pub struct ClientCredentialsGrantRequest {
	/// Registration authenticating as itself.
	pub registration: Arc<ClientRegistration>,
}

/// Resource owner password credentials grant (RFC 6749 §4.3).
#[derive(Clone, Debug)]
pub struct PasswordGrantRequest {
	/// Registration used for the exchange.
	pub registration: Arc<ClientRegistration>,
	/// Resource owner username.
	pub username: String,
	/// Resource owner password.
	pub password: TokenSecret,
}

/// JWT bearer assertion grant (RFC 7523 §2.1).
#[derive(Clone, Debug)]
pub struct JwtBearerGrantRequest {
	/// Registration used for the exchange.
	pub registration: Arc<ClientRegistration>,
	/// Assertion sent as the `assertion` parameter.
	pub jwt: Jwt,
}

/// Token exchange grant (RFC 8693 §2.1).
#[derive(Clone, Debug)]
pub struct TokenExchangeGrantRequest {
	/// Registration used for the exchange.
	pub registration: Arc<ClientRegistration>,
	/// Token representing the party on whose behalf the request is made.
	pub subject_token: SubjectToken,
	/// Token representing the acting party, if any.
	pub actor_token: Option<SubjectToken>,
}
