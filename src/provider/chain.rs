//! Ordered provider chain and its builder.

// self
use crate::{
	_prelude::*,
	context::AuthorizationContext,
	endpoint::TokenResponseClients,
	error::ConfigError,
	provider::{
		AuthorizationCodeProvider, AuthorizedClientProvider, ClientCredentialsProvider,
		JwtBearerProvider, PasswordProvider, RefreshTokenProvider, TokenExchangeProvider,
	},
	registration::GrantType,
};

/// Ordered, immutable set of providers with at most one provider per grant.
#[derive(Clone, Debug)]
pub struct ProviderChain {
	providers: Arc<[AuthorizedClientProvider]>,
}
impl ProviderChain {
	/// Starts a builder resolving token response clients from `clients`.
	pub fn builder(clients: TokenResponseClients) -> ProviderChainBuilder {
		ProviderChainBuilder::new(clients)
	}

	/// Builds a chain with a provider for every grant, in [`GrantType::ALL`] order.
	pub fn with_all_grants(clients: TokenResponseClients) -> Result<Self, ConfigError> {
		GrantType::ALL.into_iter().fold(Self::builder(clients), ProviderChainBuilder::grant).build()
	}

	/// Providers in evaluation order.
	pub fn providers(&self) -> &[AuthorizedClientProvider] {
		&self.providers
	}

	/// Grants covered by the chain, in evaluation order.
	pub fn grants(&self) -> impl Iterator<Item = GrantType> + '_ {
		self.providers.iter().map(AuthorizedClientProvider::grant_type)
	}

	/// Returns the single provider that applies to `context`, if any.
	///
	/// More than one applicable provider means the chain is misconfigured and is reported as
	/// [`ConfigError::AmbiguousProviders`].
	pub fn select(
		&self,
		context: &AuthorizationContext,
		now: OffsetDateTime,
	) -> Result<Option<&AuthorizedClientProvider>, ConfigError> {
		let mut applicable = self.providers.iter().filter(|provider| provider.applies(context, now));
		let Some(first) = applicable.next() else {
			return Ok(None);
		};
		let rest = applicable.map(AuthorizedClientProvider::grant_type).collect::<Vec<_>>();

		if rest.is_empty() {
			Ok(Some(first))
		} else {
			let grants = std::iter::once(first.grant_type()).chain(rest).collect();

			Err(ConfigError::AmbiguousProviders {
				registration_id: context.registration.registration_id.clone(),
				grants,
			})
		}
	}
}

/// Builder for [`ProviderChain`] values.
///
/// Grants added by name get their token response client from the [`TokenResponseClients`]
/// handed to [`ProviderChain::builder`]; preconfigured providers can be added with
/// [`provider`](Self::provider).
#[derive(Debug)]
pub struct ProviderChainBuilder {
	clients: TokenResponseClients,
	clock_skew: Duration,
	entries: Vec<Entry>,
}
impl ProviderChainBuilder {
	fn new(clients: TokenResponseClients) -> Self {
		Self { clients, clock_skew: Duration::ZERO, entries: Vec::new() }
	}

	/// Adds the provider for `grant`.
	pub fn grant(mut self, grant: GrantType) -> Self {
		self.entries.push(Entry::Grant(grant));

		self
	}

	/// Adds the authorization_code provider.
	pub fn authorization_code(self) -> Self {
		self.grant(GrantType::AuthorizationCode)
	}

	/// Adds the refresh_token provider.
	pub fn refresh_token(self) -> Self {
		self.grant(GrantType::RefreshToken)
	}

	/// Adds the client_credentials provider.
	pub fn client_credentials(self) -> Self {
		self.grant(GrantType::ClientCredentials)
	}

	/// Adds the password provider.
	pub fn password(self) -> Self {
		self.grant(GrantType::Password)
	}

	/// Adds the jwt_bearer provider.
	pub fn jwt_bearer(self) -> Self {
		self.grant(GrantType::JwtBearer)
	}

	/// Adds the token_exchange provider.
	pub fn token_exchange(self) -> Self {
		self.grant(GrantType::TokenExchange)
	}

	/// Clock skew applied by a refresh_token provider added by grant.
	pub fn clock_skew(mut self, clock_skew: Duration) -> Self {
		self.clock_skew = clock_skew;

		self
	}

	/// Adds a preconfigured provider.
	pub fn provider(mut self, provider: impl Into<AuthorizedClientProvider>) -> Self {
		self.entries.push(Entry::Provider(provider.into()));

		self
	}

	/// Resolves every provider and rejects empty chains and duplicate grants.
	pub fn build(self) -> Result<ProviderChain, ConfigError> {
		let mut seen = Vec::with_capacity(self.entries.len());
		let mut providers = Vec::with_capacity(self.entries.len());

		for entry in self.entries {
			let provider = match entry {
				Entry::Grant(grant) => resolve(grant, &self.clients, self.clock_skew)?,
				Entry::Provider(provider) => provider,
			};
			let grant = provider.grant_type();

			if seen.contains(&grant) {
				return Err(ConfigError::DuplicateProvider { grant });
			}

			seen.push(grant);
			providers.push(provider);
		}

		if providers.is_empty() {
			return Err(ConfigError::EmptyProviderChain);
		}

		Ok(ProviderChain { providers: providers.into() })
	}
}

#[derive(Debug)]
enum Entry {
	Grant(GrantType),
	Provider(AuthorizedClientProvider),
}

fn resolve(
	grant: GrantType,
	clients: &TokenResponseClients,
	clock_skew: Duration,
) -> Result<AuthorizedClientProvider, ConfigError> {
	let provider = match grant {
		GrantType::AuthorizationCode => AuthorizationCodeProvider.into(),
		GrantType::RefreshToken =>
			RefreshTokenProvider::new(clients.require_refresh_token()?)
				.with_clock_skew(clock_skew)
				.into(),
		GrantType::ClientCredentials =>
			ClientCredentialsProvider::new(clients.require_client_credentials()?).into(),
		GrantType::Password => PasswordProvider::new(clients.require_password()?).into(),
		GrantType::JwtBearer => JwtBearerProvider::new(clients.require_jwt_bearer()?).into(),
		GrantType::TokenExchange =>
			TokenExchangeProvider::new(clients.require_token_exchange()?).into(),
	};

	Ok(provider)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{AccessToken, Principal, RefreshToken, RegistrationId},
		client::AuthorizedClient,
		context::ContextAttributes,
		endpoint::{
			AccessTokenResponse, AuthorizationGrantRequest, TokenResponseClient,
			TokenResponseFuture,
		},
		registration::ClientRegistration,
	};

	struct StaticClient;
	impl<R> TokenResponseClient<R> for StaticClient
	where
		R: AuthorizationGrantRequest,
	{
		fn token_response<'a>(&'a self, _request: &'a R) -> TokenResponseFuture<'a> {
			Box::pin(async { Ok(AccessTokenResponse::new("static")) })
		}
	}

	fn clients() -> TokenResponseClients {
		TokenResponseClients::with_default(Arc::new(StaticClient))
	}

	fn registration(grant: GrantType) -> Arc<ClientRegistration> {
		let builder = ClientRegistration::builder(
			RegistrationId::new("registration").expect("Fixture id should be valid."),
		)
		.client_id("client-id")
		.client_secret("client-secret")
		.grant_type(grant)
		.token_endpoint(Url::parse("https://example.com/token").expect("URL"))
		.authorization_endpoint(Url::parse("https://example.com/authorize").expect("URL"))
		.redirect_uri(Url::parse("https://app.example.com/callback").expect("URL"));

		Arc::new(builder.build().expect("Registration fixture should build."))
	}

	fn context(
		registration: Arc<ClientRegistration>,
		client: Option<AuthorizedClient>,
	) -> AuthorizationContext {
		AuthorizationContext::new(
			registration,
			Principal::named("user").expect("Fixture principal should be valid."),
			client,
			ContextAttributes::new(),
		)
	}

	fn expired_client(registration: Arc<ClientRegistration>, refresh: bool) -> AuthorizedClient {
		let issued = OffsetDateTime::now_utc() - Duration::hours(2);
		let token = AccessToken::builder()
			.value("expired")
			.issued_at(issued)
			.expires_in(Duration::hours(1))
			.build()
			.expect("Access token fixture should build.");
		let client = AuthorizedClient::new(
			registration,
			Principal::named("user").expect("Fixture principal should be valid.").name,
			token,
		);

		if refresh { client.with_refresh_token(RefreshToken::new("refresh")) } else { client }
	}

	#[test]
	fn rejects_duplicate_and_empty_chains() {
		let err = ProviderChain::builder(clients())
			.client_credentials()
			.provider(ClientCredentialsProvider::new(Arc::new(StaticClient)))
			.build()
			.expect_err("Duplicate grants should be rejected.");

		assert!(matches!(err, ConfigError::DuplicateProvider { grant: GrantType::ClientCredentials }));
		assert!(matches!(
			ProviderChain::builder(clients()).build(),
			Err(ConfigError::EmptyProviderChain)
		));
	}

	#[test]
	fn missing_clients_are_reported() {
		let err = ProviderChain::builder(TokenResponseClients::default())
			.authorization_code()
			.password()
			.build()
			.expect_err("Password provider without a client should be rejected.");

		assert!(matches!(
			err,
			ConfigError::MissingTokenResponseClient { grant: GrantType::Password }
		));
	}

	#[test]
	fn selects_exactly_one_provider() {
		let chain = ProviderChain::with_all_grants(clients()).expect("Full chain should build.");
		let now = OffsetDateTime::now_utc();
		let selected = |ctx: &AuthorizationContext| {
			chain
				.select(ctx, now)
				.expect("Selection should not be ambiguous.")
				.map(AuthorizedClientProvider::grant_type)
		};
		let credentials = registration(GrantType::ClientCredentials);

		assert_eq!(chain.grants().count(), 6);
		assert_eq!(selected(&context(credentials.clone(), None)), Some(GrantType::ClientCredentials));
		assert_eq!(
			selected(&context(credentials.clone(), Some(expired_client(credentials.clone(), true)))),
			Some(GrantType::RefreshToken)
		);
		assert_eq!(
			selected(&context(credentials.clone(), Some(expired_client(credentials.clone(), false)))),
			Some(GrantType::ClientCredentials)
		);

		let code = registration(GrantType::AuthorizationCode);

		assert_eq!(selected(&context(code.clone(), None)), Some(GrantType::AuthorizationCode));
		assert_eq!(
			selected(&context(code.clone(), Some(expired_client(code.clone(), false)))),
			Some(GrantType::AuthorizationCode)
		);
		assert_eq!(
			selected(&context(code.clone(), Some(expired_client(code, true)))),
			Some(GrantType::RefreshToken)
		);
		// Password credentials and principal tokens are absent.
		assert_eq!(selected(&context(registration(GrantType::Password), None)), None);
		assert_eq!(selected(&context(registration(GrantType::JwtBearer), None)), None);
		assert_eq!(selected(&context(registration(GrantType::TokenExchange), None)), None);
	}

	#[test]
	fn clock_skew_refreshes_early() {
		let credentials = registration(GrantType::ClientCredentials);
		let token = AccessToken::builder()
			.value("valid")
			.expires_in(Duration::minutes(30))
			.build()
			.expect("Access token fixture should build.");
		let client = AuthorizedClient::new(
			credentials.clone(),
			Principal::named("user").expect("Fixture principal should be valid.").name,
			token,
		)
		.with_refresh_token(RefreshToken::new("refresh"));
		let ctx = context(credentials, Some(client));
		let now = OffsetDateTime::now_utc();
		let strict = ProviderChain::with_all_grants(clients()).expect("Chain should build.");
		let skewed = ProviderChain::builder(clients())
			.clock_skew(Duration::hours(1))
			.refresh_token()
			.client_credentials()
			.build()
			.expect("Chain should build.");

		assert!(strict.select(&ctx, now).expect("Selection should succeed.").is_none());
		assert_eq!(
			skewed
				.select(&ctx, now)
				.expect("Selection should succeed.")
				.map(AuthorizedClientProvider::grant_type),
			Some(GrantType::RefreshToken)
		);
	}
}
