//! Error types shared by the manager, providers, token response clients, and repositories.

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenBuilderError, IdentifierError, JwtError, RegistrationId, ScopeValidationError},
	registration::{ClientRegistrationError, GrantType},
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Authorized client repository failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem, raised before any token endpoint call.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// No provider can obtain a token without user interaction.
	///
	/// The caller is expected to start the interactive authorization_code flow (or collect
	/// the missing credentials) and retry.
	#[error("Registration `{registration_id}` requires client authorization: {error}.")]
	ClientAuthorizationRequired {
		/// Registration that needs authorization.
		registration_id: RegistrationId,
		/// Error carrying the `client_authorization_required` code.
		error: OAuth2Error,
	},
	/// Token endpoint rejected the grant with an OAuth 2.0 error response.
	#[error("The {grant} grant failed: {error}.")]
	Authorization {
		/// Grant that was attempted.
		grant: GrantType,
		/// Error returned by the authorization server.
		error: OAuth2Error,
	},
}
impl Error {
	/// Builds a [`Error::ClientAuthorizationRequired`] for the provided registration.
	pub fn client_authorization_required(registration_id: RegistrationId) -> Self {
		let error = OAuth2Error::new(OAuth2Error::CLIENT_AUTHORIZATION_REQUIRED).with_description(
			format!("Authorization required for client registration `{registration_id}`"),
		);

		Self::ClientAuthorizationRequired { registration_id, error }
	}

	/// Returns the OAuth 2.0 error carried by this failure, if any.
	pub fn oauth2_error(&self) -> Option<&OAuth2Error> {
		match self {
			Self::ClientAuthorizationRequired { error, .. } | Self::Authorization { error, .. } =>
				Some(error),
			_ => None,
		}
	}

	/// Returns `true` if the authorization server reported the stored grant as unusable.
	pub fn invalidates_authorized_client(&self) -> bool {
		self.oauth2_error().is_some_and(|error| {
			error.code == OAuth2Error::INVALID_GRANT || error.code == OAuth2Error::INVALID_TOKEN
		})
	}
}

/// OAuth 2.0 error payload (RFC 6749 §5.2).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Error {
	/// Error code, e.g. `invalid_grant`.
	pub code: String,
	/// Human-readable description.
	pub description: Option<String>,
	/// URI identifying a page with more information.
	pub uri: Option<String>,
}
impl OAuth2Error {
	/// Code used when a registration needs interactive authorization.
	pub const CLIENT_AUTHORIZATION_REQUIRED: &'static str = "client_authorization_required";
	/// Code reported when the state parameter of an authorization response does not match.
	pub const INVALID_STATE_PARAMETER: &'static str = "invalid_state_parameter";
	/// RFC 6749 code for rejected grants.
	pub const INVALID_GRANT: &'static str = "invalid_grant";
	/// RFC 6750 code for rejected tokens.
	pub const INVALID_TOKEN: &'static str = "invalid_token";

	/// Creates an error with only a code.
	pub fn new(code: impl Into<String>) -> Self {
		Self { code: code.into(), description: None, uri: None }
	}

	/// Attaches a description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Attaches an error URI.
	pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());

		self
	}
}
impl Display for OAuth2Error {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "[{}]", self.code)?;

		if let Some(description) = &self.description {
			write!(f, " {description}")?;
		}

		Ok(())
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Endpoint URL was rejected by the OAuth client.
	#[error("Registration contains an invalid endpoint URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// No registration exists for the requested identifier.
	#[error("No client registration found for `{registration_id}`.")]
	UnknownRegistration {
		/// Requested identifier.
		registration_id: RegistrationId,
	},
	/// More than one provider claimed the same authorization context.
	#[error("Providers {grants:?} all apply to registration `{registration_id}`.")]
	AmbiguousProviders {
		/// Registration being authorized.
		registration_id: RegistrationId,
		/// Grants of every provider that applied.
		grants: Vec<GrantType>,
	},
	/// Provider chain lists two providers for one grant type.
	#[error("The provider chain already contains a {grant} provider.")]
	DuplicateProvider {
		/// Duplicated grant.
		grant: GrantType,
	},
	/// Provider chain is empty.
	#[error("The provider chain must contain at least one provider.")]
	EmptyProviderChain,
	/// No token response client is configured for the grant.
	#[error("No token response client is configured for the {grant} grant.")]
	MissingTokenResponseClient {
		/// Grant lacking a client.
		grant: GrantType,
	},
	/// Operation requires a registration configured for another grant.
	#[error("Registration `{registration_id}` is not configured for the {grant} grant.")]
	UnsupportedGrant {
		/// Registration identifier.
		registration_id: RegistrationId,
		/// Grant the operation needs.
		grant: GrantType,
	},
	/// Registration failed validation.
	#[error(transparent)]
	InvalidRegistration(#[from] ClientRegistrationError),
	/// Scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] ScopeValidationError),
	/// Identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// Principal JWT could not be decoded.
	#[error(transparent)]
	Jwt(#[from] JwtError),
	/// Access token builder validation failed.
	#[error("Unable to build access token.")]
	AccessTokenBuild(#[from] AccessTokenBuilderError),
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Token endpoint returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
