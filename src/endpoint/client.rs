//! Token response clients and the per-grant client table.

// self
use crate::{
	_prelude::*,
	endpoint::{
		AccessTokenResponse, AuthorizationCodeGrantRequest, AuthorizationGrantRequest,
		ClientCredentialsGrantRequest, JwtBearerGrantRequest, PasswordGrantRequest,
		RefreshTokenGrantRequest, TokenExchangeGrantRequest,
	},
	error::ConfigError,
};

/// Boxed future returned by [`TokenResponseClient::token_response`].
pub type TokenResponseFuture<'a> = Pin<Box<dyn Future<Output = Result<AccessTokenResponse>> + 'a + Send>>;

/// Performs the token endpoint exchange for grant requests of type `R`.
///
/// Implementations report OAuth error responses as
/// [`Error::Authorization`](crate::error::Error::Authorization) so the manager can recognize
/// rejected grants; every other failure uses the transport, transient, or config variants.
pub trait TokenResponseClient<R>
where
	Self: Send + Sync,
	R: AuthorizationGrantRequest,
{
	/// Exchanges `request` for an access token response.
	fn token_response<'a>(&'a self, request: &'a R) -> TokenResponseFuture<'a>;
}

/// Shared handle to a token response client for grant requests of type `R`.
pub type SharedTokenResponseClient<R> = Arc<dyn TokenResponseClient<R>>;

/// Per-grant token response clients.
///
/// Each slot is an optional override; [`TokenResponseClients::or_default`] fills the empty
/// slots from one client that handles every grant, typically
/// [`HttpTokenResponseClient`](crate::oauth::HttpTokenResponseClient).
#[derive(Clone, Default)]
pub struct TokenResponseClients {
	authorization_code: Option<SharedTokenResponseClient<AuthorizationCodeGrantRequest>>,
	refresh_token: Option<SharedTokenResponseClient<RefreshTokenGrantRequest>>,
	client_credentials: Option<SharedTokenResponseClient<ClientCredentialsGrantRequest>>,
	password: Option<SharedTokenResponseClient<PasswordGrantRequest>>,
	jwt_bearer: Option<SharedTokenResponseClient<JwtBearerGrantRequest>>,
	token_exchange: Option<SharedTokenResponseClient<TokenExchangeGrantRequest>>,
}
impl TokenResponseClients {
	/// Uses `client` for every grant.
	pub fn with_default<C>(client: Arc<C>) -> Self
	where
		C: 'static + AnyGrantTokenResponseClient,
	{
		Self::default().or_default(client)
	}

	/// Fills every slot without an override with `client`.
	pub fn or_default<C>(mut self, client: Arc<C>) -> Self
	where
		C: 'static + AnyGrantTokenResponseClient,
	{
		if self.authorization_code.is_none() {
			self.authorization_code = Some(client.clone());
		}
		if self.refresh_token.is_none() {
			self.refresh_token = Some(client.clone());
		}
		if self.client_credentials.is_none() {
			self.client_credentials = Some(client.clone());
		}
		if self.password.is_none() {
			self.password = Some(client.clone());
		}
		if self.jwt_bearer.is_none() {
			self.jwt_bearer = Some(client.clone());
		}
		if self.token_exchange.is_none() {
			self.token_exchange = Some(client);
		}

		self
	}

	/// Overrides the authorization_code client.
	pub fn authorization_code(
		mut self,
		client: SharedTokenResponseClient<AuthorizationCodeGrantRequest>,
	) -> Self {
		self.authorization_code = Some(client);

		self
	}

	/// Overrides the refresh_token client.
	pub fn refresh_token(mut self, client: SharedTokenResponseClient<RefreshTokenGrantRequest>) -> Self {
		self.refresh_token = Some(client);

		self
	}

	/// Overrides the client_credentials client.
	pub fn client_credentials(
		mut self,
		client: SharedTokenResponseClient<ClientCredentialsGrantRequest>,
	) -> Self {
		self.client_credentials = Some(client);

		self
	}

	/// Overrides the password client.
	pub fn password(mut self, client: SharedTokenResponseClient<PasswordGrantRequest>) -> Self {
		self.password = Some(client);

		self
	}

	/// Overrides the jwt_bearer client.
	pub fn jwt_bearer(mut self, client: SharedTokenResponseClient<JwtBearerGrantRequest>) -> Self {
		self.jwt_bearer = Some(client);

		self
	}

	/// Overrides the token_exchange client.
	pub fn token_exchange(
		mut self,
		client: SharedTokenResponseClient<TokenExchangeGrantRequest>,
	) -> Self {
		self.token_exchange = Some(client);

		self
	}

	/// The authorization_code client, if configured.
	pub fn authorization_code_client(
		&self,
	) -> Option<SharedTokenResponseClient<AuthorizationCodeGrantRequest>> {
		self.authorization_code.clone()
	}

	pub(crate) fn require_refresh_token(
		&self,
	) -> Result<SharedTokenResponseClient<RefreshTokenGrantRequest>, ConfigError> {
		require(&self.refresh_token)
	}

	pub(crate) fn require_client_credentials(
		&self,
	) -> Result<SharedTokenResponseClient<ClientCredentialsGrantRequest>, ConfigError> {
		require(&self.client_credentials)
	}

	pub(crate) fn require_password(
		&self,
	) -> Result<SharedTokenResponseClient<PasswordGrantRequest>, ConfigError> {
		require(&self.password)
	}

	pub(crate) fn require_jwt_bearer(
		&self,
	) -> Result<SharedTokenResponseClient<JwtBearerGrantRequest>, ConfigError> {
		require(&self.jwt_bearer)
	}

	pub(crate) fn require_token_exchange(
		&self,
	) -> Result<SharedTokenResponseClient<TokenExchangeGrantRequest>, ConfigError> {
		require(&self.token_exchange)
	}
}
impl Debug for TokenResponseClients {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponseClients")
			.field("authorization_code", &self.authorization_code.is_some())
			.field("refresh_token", &self.refresh_token.is_some())
			.field("client_credentials", &self.client_credentials.is_some())
			.field("password", &self.password.is_some())
			.field("jwt_bearer", &self.jwt_bearer.is_some())
			.field("token_exchange", &self.token_exchange.is_some())
			.finish()
	}
}

/// Token response client that handles every grant request type.
pub trait AnyGrantTokenResponseClient:
	TokenResponseClient<AuthorizationCodeGrantRequest>
	+ TokenResponseClient<RefreshTokenGrantRequest>
	+ TokenResponseClient<ClientCredentialsGrantRequest>
	+ TokenResponseClient<PasswordGrantRequest>
	+ TokenResponseClient<JwtBearerGrantRequest>
	+ TokenResponseClient<TokenExchangeGrantRequest>
{
}
impl<T> AnyGrantTokenResponseClient for T where
	T: TokenResponseClient<AuthorizationCodeGrantRequest>
		+ TokenResponseClient<RefreshTokenGrantRequest>
		+ TokenResponseClient<ClientCredentialsGrantRequest>
		+ TokenResponseClient<PasswordGrantRequest>
		+ TokenResponseClient<JwtBearerGrantRequest>
		+ TokenResponseClient<TokenExchangeGrantRequest>
{
}

fn require<R>(
	slot: &Option<SharedTokenResponseClient<R>>,
) -> Result<SharedTokenResponseClient<R>, ConfigError>
where
	R: AuthorizationGrantRequest,
{
	slot.clone().ok_or(ConfigError::MissingTokenResponseClient { grant: R::GRANT_TYPE })
}
