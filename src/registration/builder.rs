// std
use std::iter::IntoIterator;
// self
use crate::{
	_prelude::*,
	auth::{RegistrationId, ScopeSet, ScopeValidationError, TokenSecret},
	registration::{ClientAuthMethod, ClientRegistration, GrantType, ProviderEndpoints},
};

/// Errors raised while constructing or validating registrations.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ClientRegistrationError {
	/// Client identifier is mandatory.
	#[error("Missing client identifier.")]
	MissingClientId,
	/// Grant type is mandatory.
	#[error("Missing grant type.")]
	MissingGrantType,
	/// Token endpoint is mandatory for all grants.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Authorization endpoint is required for the authorization_code grant.
	#[error("The authorization_code grant requires an authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Redirect URI is required for the authorization_code grant.
	#[error("The authorization_code grant requires a redirect URI.")]
	MissingRedirectUri,
	/// Confidential authentication methods need a secret.
	#[error("Client authentication method `{method}` requires a client secret.")]
	MissingClientSecret {
		/// Configured authentication method.
		method: &'static str,
	},
	/// Public clients cannot authenticate as themselves.
	#[error("The client_credentials grant requires a confidential client.")]
	PublicClientCredentials,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Scope entries failed validation.
	#[error(transparent)]
	InvalidScope(#[from] ScopeValidationError),
}

/// Builder for [`ClientRegistration`] values.
#[derive(Debug)]
pub struct ClientRegistrationBuilder {
	registration_id: RegistrationId,
	client_id: Option<String>,
	client_secret: Option<TokenSecret>,
	client_auth_method: ClientAuthMethod,
	grant_type: Option<GrantType>,
	scopes: Vec<String>,
	redirect_uri: Option<Url>,
	authorization_endpoint: Option<Url>,
	token_endpoint: Option<Url>,
	client_name: Option<String>,
}
impl ClientRegistrationBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(registration_id: RegistrationId) -> Self {
		Self {
			registration_id,
			client_id: None,
			client_secret: None,
			client_auth_method: ClientAuthMethod::default(),
			grant_type: None,
			scopes: Vec::new(),
			redirect_uri: None,
			authorization_endpoint: None,
			token_endpoint: None,
			client_name: None,
		}
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Sets the grant type.
	pub fn grant_type(mut self, grant: GrantType) -> Self {
		self.grant_type = Some(grant);

		self
	}

	/// Adds requested scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets a human-readable client name.
	pub fn client_name(mut self, name: impl Into<String>) -> Self {
		self.client_name = Some(name.into());

		self
	}

	/// Consumes the builder and validates the resulting registration.
	pub fn build(self) -> Result<ClientRegistration, ClientRegistrationError> {
		let client_id = self
			.client_id
			.filter(|id| !id.trim().is_empty())
			.ok_or(ClientRegistrationError::MissingClientId)?;
		let grant_type = self.grant_type.ok_or(ClientRegistrationError::MissingGrantType)?;
		let token = self.token_endpoint.ok_or(ClientRegistrationError::MissingTokenEndpoint)?;
		let registration = ClientRegistration {
			registration_id: self.registration_id,
			client_id,
			client_secret: self.client_secret,
			client_auth_method: self.client_auth_method,
			grant_type,
			scopes: ScopeSet::new(self.scopes)?,
			redirect_uri: self.redirect_uri,
			endpoints: ProviderEndpoints { authorization: self.authorization_endpoint, token },
			client_name: self.client_name,
		};

		registration.validate()?;

		Ok(registration)
	}
}

impl ClientRegistration {
	fn validate(&self) -> Result<(), ClientRegistrationError> {
		validate_endpoint("token", &self.endpoints.token)?;

		if let Some(authorization) = self.endpoints.authorization.as_ref() {
			validate_endpoint("authorization", authorization)?;
		}
		if self.uses(GrantType::AuthorizationCode) {
			if self.endpoints.authorization.is_none() {
				return Err(ClientRegistrationError::MissingAuthorizationEndpoint);
			}
			if self.redirect_uri.is_none() {
				return Err(ClientRegistrationError::MissingRedirectUri);
			}
		}

		match self.client_auth_method {
			ClientAuthMethod::None if self.uses(GrantType::ClientCredentials) =>
				Err(ClientRegistrationError::PublicClientCredentials),
			ClientAuthMethod::None => Ok(()),
			method if self.client_secret.as_ref().is_none_or(TokenSecret::is_blank) =>
				Err(ClientRegistrationError::MissingClientSecret { method: method.as_str() }),
			_ => Ok(()),
		}
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ClientRegistrationError> {
	if url.scheme() != "https" {
		Err(ClientRegistrationError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
