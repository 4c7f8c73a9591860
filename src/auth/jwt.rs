//! Decoded JSON Web Token carried by JWT-authenticated principals.
//!
//! The principal was authenticated upstream (by a resource server or login flow), so the
//! token is decoded without signature verification. The raw compact serialization is kept
//! verbatim because it is forwarded as the `assertion` of a jwt-bearer grant or the
//! `subject_token` of a token-exchange grant.

// crates.io
use jsonwebtoken::{dangerous::insecure_decode, errors::Error as JsonWebTokenError};
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// JSON object holding JOSE headers or JWT claims.
pub type JsonObject = Map<String, Value>;

/// Errors raised while decoding a compact JWT.
#[derive(Debug, ThisError)]
pub enum JwtError {
	/// The token is not a well-formed compact JWT with a JSON object payload.
	#[error("JWT could not be decoded.")]
	Decode(#[from] JsonWebTokenError),
	/// The decoded JOSE header could not be represented as a JSON object.
	#[error("JWT header could not be represented as JSON.")]
	Header(#[source] serde_json::Error),
	/// A time claim is out of range.
	#[error("JWT `{claim}` claim is not a valid timestamp.")]
	InvalidTimestamp {
		/// Claim name.
		claim: &'static str,
	},
}

/// Decoded (unverified) JSON Web Token.
#[derive(Clone, PartialEq)]
pub struct Jwt {
	token_value: TokenSecret,
	headers: JsonObject,
	claims: JsonObject,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
}
impl Jwt {
	/// Decodes a compact-serialized JWT without verifying its signature or time claims.
	///
	/// The header has to name an algorithm `jsonwebtoken` knows; unsecured (`alg: none`)
	/// tokens are rejected.
	pub fn decode_unverified(token: impl Into<String>) -> Result<Self, JwtError> {
		let token = token.into();
		let decoded = insecure_decode::<JsonObject>(&token)?;
		let headers = match serde_json::to_value(&decoded.header).map_err(JwtError::Header)? {
			Value::Object(headers) => headers,
			_ => JsonObject::new(),
		};

		Self::from_parts(token, headers, decoded.claims)
	}

	/// Builds a token from an already-decoded header and claim set.
	pub fn from_parts(
		token_value: impl Into<String>,
		headers: JsonObject,
		claims: JsonObject,
	) -> Result<Self, JwtError> {
		let issued_at = timestamp_claim(&claims, "iat")?;
		let expires_at = timestamp_claim(&claims, "exp")?;

		Ok(Self { token_value: TokenSecret::new(token_value), headers, claims, issued_at, expires_at })
	}

	/// Raw compact serialization.
	pub fn token_value(&self) -> &TokenSecret {
		&self.token_value
	}

	/// JOSE header parameters.
	pub fn headers(&self) -> &JsonObject {
		&self.headers
	}

	/// Claim set.
	pub fn claims(&self) -> &JsonObject {
		&self.claims
	}

	/// Returns a string claim by name.
	pub fn claim_str(&self, name: &str) -> Option<&str> {
		self.claims.get(name).and_then(Value::as_str)
	}

	/// `sub` claim.
	pub fn subject(&self) -> Option<&str> {
		self.claim_str("sub")
	}

	/// `iat` claim.
	pub fn issued_at(&self) -> Option<OffsetDateTime> {
		self.issued_at
	}

	/// `exp` claim.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}
}
impl Debug for Jwt {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Jwt")
			.field("token_value", &"<redacted>")
			.field("subject", &self.subject())
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

fn timestamp_claim(
	claims: &JsonObject,
	claim: &'static str,
) -> Result<Option<OffsetDateTime>, JwtError> {
	let Some(value) = claims.get(claim) else {
		return Ok(None);
	};
	let seconds = value.as_i64().ok_or(JwtError::InvalidTimestamp { claim })?;

	OffsetDateTime::from_unix_timestamp(seconds)
		.map(Some)
		.map_err(|_| JwtError::InvalidTimestamp { claim })
}
