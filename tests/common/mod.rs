//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc};
// crates.io
use parking_lot::Mutex;
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};
// self
use oauth2_authorizer::{
	auth::{AccessToken, Jwt, Principal, RefreshToken, RegistrationId},
	client::AuthorizedClient,
	endpoint::{
		AccessTokenResponse, AuthorizationGrantRequest, GrantRequest, TokenResponseClient,
		TokenResponseClients, TokenResponseFuture,
	},
	error::{Error, OAuth2Error},
	manager::AuthorizedClientManager,
	provider::ProviderChain,
	registration::{ClientRegistration, GrantType, InMemoryClientRegistrationRepository},
	store::InMemoryAuthorizedClientRepository,
	url::Url,
};

pub const TOKEN_ENDPOINT: &str = "https://auth.example.com/oauth2/token";

pub fn registration_id(id: &str) -> RegistrationId {
	RegistrationId::new(id).expect("Registration identifier fixture should be valid.")
}

pub fn principal(name: &str) -> Principal {
	Principal::named(name).expect("Principal fixture should be valid.")
}

/// Confidential registration for `grant` with `read write` scopes.
pub fn registration(id: &str, grant: GrantType) -> ClientRegistration {
	let mut builder = ClientRegistration::builder(registration_id(id))
		.client_id(format!("{id}-client"))
		.client_secret(format!("{id}-secret"))
		.grant_type(grant)
		.scopes(["read", "write"])
		.token_endpoint(Url::parse(TOKEN_ENDPOINT).expect("Token endpoint fixture should parse."));

	if grant == GrantType::AuthorizationCode {
		builder = builder
			.authorization_endpoint(
				Url::parse("https://auth.example.com/oauth2/authorize")
					.expect("Authorization endpoint fixture should parse."),
			)
			.redirect_uri(
				Url::parse("https://app.example.com/callback")
					.expect("Redirect URI fixture should parse."),
			);
	}

	builder.build().expect("Registration fixture should build.")
}

/// Unsigned JWT whose `sub` claim is `subject`.
pub fn principal_jwt(subject: &str) -> Jwt {
	let mut claims = Map::new();

	claims.insert("sub".into(), Value::String(subject.into()));

	Jwt::from_parts(format!("eyJhbGciOiJub25lIn0.{subject}.signature"), Map::new(), claims)
		.expect("JWT fixture should build.")
}

/// Access token issued `age` ago that lives for `lifetime`.
pub fn access_token(value: &str, age: Duration, lifetime: Duration) -> AccessToken {
	AccessToken::builder()
		.value(value)
		.issued_at(OffsetDateTime::now_utc() - age)
		.expires_in(lifetime)
		.build()
		.expect("Access token fixture should build.")
}

pub fn expired_client(
	registration: Arc<ClientRegistration>,
	principal: &Principal,
	refresh_token: Option<&str>,
) -> AuthorizedClient {
	let client = AuthorizedClient::new(
		registration,
		principal.name.clone(),
		access_token("expired-access", Duration::hours(2), Duration::hours(1)),
	);

	match refresh_token {
		Some(value) => client.with_refresh_token(RefreshToken::new(value)),
		None => client,
	}
}

/// Token response client that records every request and replays queued outcomes.
///
/// Once the queue is empty it answers with a bearer token named `default-access`.
#[derive(Default)]
pub struct CapturingClient {
	requests: Mutex<Vec<GrantRequest>>,
	outcomes: Mutex<VecDeque<Result<AccessTokenResponse, OAuth2Error>>>,
}
impl CapturingClient {
	pub fn respond_with(self, response: AccessTokenResponse) -> Self {
		self.outcomes.lock().push_back(Ok(response));

		self
	}

	pub fn fail_with(self, error: OAuth2Error) -> Self {
		self.outcomes.lock().push_back(Err(error));

		self
	}

	pub fn requests(&self) -> Vec<GrantRequest> {
		self.requests.lock().clone()
	}
}
impl<R> TokenResponseClient<R> for CapturingClient
where
	R: AuthorizationGrantRequest + Clone + Into<GrantRequest>,
{
	fn token_response<'a>(&'a self, request: &'a R) -> TokenResponseFuture<'a> {
		self.requests.lock().push(request.clone().into());

		let outcome = self.outcomes.lock().pop_front();

		Box::pin(async move {
			match outcome {
				Some(Ok(response)) => Ok(response),
				Some(Err(error)) => Err(Error::Authorization { grant: R::GRANT_TYPE, error }),
				None => Ok(AccessTokenResponse::new("default-access")
					.with_expires_in(Duration::hours(1))),
			}
		})
	}
}

/// Manager with every built-in provider, backed by `client` and an in-memory repository.
pub fn manager<I>(
	registrations: I,
	client: Arc<CapturingClient>,
) -> (AuthorizedClientManager, InMemoryAuthorizedClientRepository)
where
	I: IntoIterator<Item = ClientRegistration>,
{
	let repository = InMemoryAuthorizedClientRepository::default();
	let providers = ProviderChain::with_all_grants(TokenResponseClients::with_default(client))
		.expect("Provider chain fixture should build.");
	let manager = AuthorizedClientManager::new(
		Arc::new(InMemoryClientRegistrationRepository::new(registrations)),
		Arc::new(repository.clone()),
		providers,
	);

	(manager, repository)
}
