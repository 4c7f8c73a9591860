// self
use crate::_prelude::*;

/// OAuth 2.0 grant types the dispatcher can obtain tokens with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant (interactive; RFC 6749 §4.1).
	AuthorizationCode,
	/// Refresh Token grant (RFC 6749 §6).
	RefreshToken,
	/// Client Credentials grant (RFC 6749 §4.4).
	ClientCredentials,
	/// Resource Owner Password Credentials grant (RFC 6749 §4.3).
	Password,
	/// JWT Bearer assertion grant (RFC 7523).
	JwtBearer,
	/// Token Exchange grant (RFC 8693).
	TokenExchange,
}
impl GrantType {
	/// Every grant type, in the default provider order.
	pub const ALL: [GrantType; 6] = [
		GrantType::AuthorizationCode,
		GrantType::RefreshToken,
		GrantType::ClientCredentials,
		GrantType::Password,
		GrantType::JwtBearer,
		GrantType::TokenExchange,
	];

	/// Returns the `grant_type` parameter value sent to the token endpoint.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
			GrantType::Password => "password",
			GrantType::JwtBearer => "urn:ietf:params:oauth:grant-type:jwt-bearer",
			GrantType::TokenExchange => "urn:ietf:params:oauth:grant-type:token-exchange",
		}
	}

	/// Returns a short snake_case label suitable for span or metric fields.
	pub const fn label(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
			GrantType::Password => "password",
			GrantType::JwtBearer => "jwt_bearer",
			GrantType::TokenExchange => "token_exchange",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}
impl FromStr for GrantType {
	type Err = UnknownGrantType;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		GrantType::ALL
			.into_iter()
			.find(|grant| grant.as_str() == s || grant.label() == s)
			.ok_or_else(|| UnknownGrantType(s.to_owned()))
	}
}

/// Error returned when parsing an unrecognized grant type.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown grant type `{0}`.")]
pub struct UnknownGrantType(pub String);
