//! Authenticated principals on whose behalf clients are authorized.

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, Jwt, PrincipalName, TokenSecret},
};

/// Token type URI for JWT subject/actor tokens (RFC 8693 §3).
pub const JWT_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:jwt";
/// Token type URI for opaque access tokens (RFC 8693 §3).
pub const ACCESS_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:access_token";

/// Bearer credential a principal was authenticated with.
#[derive(Clone, Debug, PartialEq)]
pub enum PrincipalCredential {
	/// JWT-authenticated principal (resource-server style).
	Jwt(Jwt),
	/// Principal authenticated with an opaque access token.
	AccessToken(TokenSecret),
}

/// Authenticated identity passed to every authorize call.
#[derive(Clone, Debug, PartialEq)]
pub struct Principal {
	/// Principal name used to key authorized clients.
	pub name: PrincipalName,
	/// Bearer credential, when the principal was token-authenticated.
	pub credential: Option<PrincipalCredential>,
}
impl Principal {
	/// Creates a principal identified by name only.
	pub fn new(name: PrincipalName) -> Self {
		Self { name, credential: None }
	}

	/// Convenience constructor validating a raw name.
	pub fn named(name: impl Into<String>) -> Result<Self, IdentifierError> {
		Ok(Self::new(PrincipalName::new(name)?))
	}

	/// Creates a JWT-authenticated principal named after the token's `sub` claim.
	pub fn from_jwt(jwt: Jwt) -> Result<Self, IdentifierError> {
		let name = PrincipalName::new(jwt.subject().unwrap_or_default())?;

		Ok(Self { name, credential: Some(PrincipalCredential::Jwt(jwt)) })
	}

	/// Attaches an opaque access token credential.
	pub fn with_access_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.credential = Some(PrincipalCredential::AccessToken(token.into()));

		self
	}

	/// Attaches a JWT credential while keeping the current name.
	pub fn with_jwt(mut self, jwt: Jwt) -> Self {
		self.credential = Some(PrincipalCredential::Jwt(jwt));

		self
	}

	/// JWT credential, if any.
	pub fn jwt(&self) -> Option<&Jwt> {
		match &self.credential {
			Some(PrincipalCredential::Jwt(jwt)) => Some(jwt),
			_ => None,
		}
	}

	/// Resolves the credential as an RFC 8693 subject token.
	pub fn subject_token(&self) -> Option<SubjectToken> {
		match self.credential.as_ref()? {
			PrincipalCredential::Jwt(jwt) =>
				Some(SubjectToken::new(jwt.token_value().clone(), JWT_TOKEN_TYPE)),
			PrincipalCredential::AccessToken(token) =>
				Some(SubjectToken::new(token.clone(), ACCESS_TOKEN_TYPE)),
		}
	}
}

/// Token plus its RFC 8693 type identifier, used as a subject or actor token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectToken {
	/// Token value.
	pub value: TokenSecret,
	/// Token type URI (e.g. [`JWT_TOKEN_TYPE`]).
	pub token_type: String,
}
impl SubjectToken {
	/// Pairs a token with its type URI.
	pub fn new(value: impl Into<TokenSecret>, token_type: impl Into<String>) -> Self {
		Self { value: value.into(), token_type: token_type.into() }
	}
}
