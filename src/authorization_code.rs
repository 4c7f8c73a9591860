//! Interactive authorization_code + PKCE helper.
//!
//! When the manager reports [`Error::ClientAuthorizationRequired`] for an authorization_code
//! registration, the caller starts a session here, redirects the user agent to its authorize
//! URL, and completes the session from the redirect callback. Completion exchanges the code
//! through the authorization_code token response client and stores the resulting client in the
//! manager's repository, so subsequent `authorize` calls find it.

pub mod session;

pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::{Principal, RegistrationId, TokenSecret},
	client::AuthorizedClient,
	context::RequestAttributes,
	endpoint::{AuthorizationCodeGrantRequest, SharedTokenResponseClient, TokenResponseClients},
	error::ConfigError,
	manager::AuthorizedClientManager,
	registration::GrantType,
};

/// Starts and completes authorization_code redirects for a manager's registrations.
#[derive(Clone)]
pub struct AuthorizationCodeFlow {
	manager: AuthorizedClientManager,
	client: SharedTokenResponseClient<AuthorizationCodeGrantRequest>,
}
impl AuthorizationCodeFlow {
	/// Creates the flow, using the authorization_code client from `clients`.
	pub fn new(
		manager: AuthorizedClientManager,
		clients: &TokenResponseClients,
	) -> Result<Self, ConfigError> {
		let client = clients.authorization_code_client().ok_or(
			ConfigError::MissingTokenResponseClient { grant: GrantType::AuthorizationCode },
		)?;

		Ok(Self { manager, client })
	}

	/// Builds the authorize URL (state + PKCE S256) for `registration_id`.
	pub fn start_authorization(
		&self,
		registration_id: &RegistrationId,
		principal: Principal,
	) -> Result<AuthorizationCodeSession> {
		let registration = self
			.manager
			.registrations()
			.find_by_registration_id(registration_id)
			.ok_or_else(|| ConfigError::UnknownRegistration {
				registration_id: registration_id.clone(),
			})?;

		Ok(AuthorizationCodeSession::start(registration, principal)?)
	}

	/// Validates the returned state, exchanges `code`, and stores the authorized client.
	pub async fn complete_authorization(
		&self,
		session: AuthorizationCodeSession,
		returned_state: &str,
		code: impl Into<TokenSecret>,
		attributes: &RequestAttributes,
	) -> Result<AuthorizedClient> {
		session.validate_state(returned_state)?;

		let request = AuthorizationCodeGrantRequest {
			registration: session.registration.clone(),
			code: code.into(),
			redirect_uri: session.redirect_uri.clone(),
			code_verifier: Some(session.code_verifier()),
		};
		let response = self.client.token_response(&request).await?;
		let issued_at = OffsetDateTime::now_utc();
		let access_token = response.access_token_at(issued_at, &session.registration.scopes)?;
		let mut client =
			AuthorizedClient::new(session.registration, session.principal.name.clone(), access_token);

		client.refresh_token = response.refresh_token_at(issued_at);

		self.manager.repository().save(client.clone(), &session.principal.name, attributes).await?;

		Ok(client)
	}
}
impl Debug for AuthorizationCodeFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationCodeFlow").field("manager", &self.manager).finish()
	}
}
