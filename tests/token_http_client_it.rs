mod common;

// std
use std::{future::Future, pin::Pin, sync::Arc};
// crates.io
use httpmock::prelude::*;
use parking_lot::Mutex;
use time::Duration;
// self
use common::*;
use oauth2_authorizer::{
	auth::{Principal, RegistrationId},
	context::AuthorizeRequest,
	endpoint::{StaticParametersStrategy, TokenResponseClients},
	error::{ConfigError, Error, OAuth2Error, TransientError, TransportError},
	http::{ResponseCapture, ResponseMetadata, TokenHttpClient},
	manager::AuthorizedClientManager,
	oauth::{
		HttpTokenResponseClient, ReqwestTokenResponseClient, TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	provider::ProviderChain,
	registration::{
		ClientAuthMethod, ClientRegistration, GrantType, InMemoryClientRegistrationRepository,
	},
	reqwest::Client,
	store::{AuthorizedClientRepository, InMemoryAuthorizedClientRepository},
	url::Url,
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl std::fmt::Display for FakeTransportError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl std::error::Error for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	retry_after: Duration,
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn bind(&self, slot: ResponseCapture) -> Self::Handle {
		FakeHttpHandle { slot, retry_after: self.retry_after }
	}
}

struct FakeHttpHandle {
	slot: ResponseCapture,
	retry_after: Duration,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let retry_after = self.retry_after;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"Capture must be clear before dispatching a request."
			);
			slot.record(ResponseMetadata::status(429).with_retry_after(retry_after));

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)))
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	calls: Arc<Mutex<Vec<(GrantType, Option<ResponseMetadata>)>>>,
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		grant: GrantType,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		let status = meta.and_then(|value| value.status);
		let retry_after = meta.and_then(|value| value.retry_after);

		self.calls.lock().push((grant, meta.cloned()));

		match err {
			HttpClientError::Reqwest(inner) => TransientError::TokenEndpoint {
				message: format!("Fake transport error: {inner}"),
				status,
				retry_after,
			}
			.into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => TransientError::TokenEndpoint {
				message: format!("Unhandled HTTP client error: {other:?}"),
				status,
				retry_after,
			}
			.into(),
		}
	}
}

fn mock_registration(
	server: &MockServer,
	id: &str,
	grant: GrantType,
	method: ClientAuthMethod,
) -> ClientRegistration {
	ClientRegistration::builder(registration_id(id))
		.client_id(format!("{id}-client"))
		.client_secret(format!("{id}-secret"))
		.client_auth_method(method)
		.grant_type(grant)
		.scopes(["api.read"])
		.token_endpoint(
			Url::parse(&server.url("/token")).expect("Mock token endpoint should parse."),
		)
		.build()
		.expect("Mock registration should build.")
}

fn test_token_response_client() -> ReqwestTokenResponseClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	HttpTokenResponseClient::with_reqwest_client(client)
}

fn http_manager(
	registration: ClientRegistration,
	client: ReqwestTokenResponseClient,
) -> (AuthorizedClientManager, InMemoryAuthorizedClientRepository) {
	let repository = InMemoryAuthorizedClientRepository::default();
	let providers =
		ProviderChain::with_all_grants(TokenResponseClients::with_default(Arc::new(client)))
			.expect("Provider chain should build.");
	let manager = AuthorizedClientManager::new(
		Arc::new(InMemoryClientRegistrationRepository::new([registration])),
		Arc::new(repository.clone()),
		providers,
	);

	(manager, repository)
}

#[tokio::test]
async fn client_credentials_posts_form_and_maps_the_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("grant_type=client_credentials")
				.body_includes("client_secret=billing-secret")
				.body_includes("resource=https%3A%2F%2Fapi.example.com");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"http-token\",\"token_type\":\"bearer\",\"expires_in\":1800,\"scope\":\"api.read\"}",
			);
		})
		.await;
	let strategy = StaticParametersStrategy::default().with_parameter(
		registration_id("billing"),
		"resource",
		"https://api.example.com",
	);
	let (manager, repository) = http_manager(
		mock_registration(
			&server,
			"billing",
			GrantType::ClientCredentials,
			ClientAuthMethod::ClientSecretPost,
		),
		test_token_response_client().with_strategy(Arc::new(strategy)),
	);
	let request = AuthorizeRequest::for_registration(registration_id("billing"), principal("svc"));
	let first = manager.authorize(&request).await.expect("Token request should succeed.");
	let second = manager.authorize(&request).await.expect("Stored token should be reused.");

	assert_eq!(first.access_token.value.expose(), "http-token");
	assert_eq!(first.access_token.token_type, "Bearer");
	assert!(first.access_token.expires_at.is_some());
	assert_eq!(second, first);
	assert_eq!(repository.len(), 1);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn token_exchange_posts_rfc8693_form_with_basic_auth() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header_exists("authorization")
				.body_includes(
					"grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Atoken-exchange",
				)
				.body_includes("subject_token=upstream-access")
				.body_includes(
					"subject_token_type=urn%3Aietf%3Aparams%3Aoauth%3Atoken-type%3Aaccess_token",
				);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"exchanged\",\"token_type\":\"N_A\",\"expires_in\":300,\"issued_token_type\":\"urn:ietf:params:oauth:token-type:access_token\"}",
			);
		})
		.await;
	let (manager, _) = http_manager(
		mock_registration(
			&server,
			"downstream",
			GrantType::TokenExchange,
			ClientAuthMethod::ClientSecretBasic,
		),
		test_token_response_client(),
	);
	let user = principal("mia").with_access_token("upstream-access");
	let request = AuthorizeRequest::for_registration(registration_id("downstream"), user);
	let authorized = manager.authorize(&request).await.expect("Token exchange should succeed.");

	assert_eq!(authorized.access_token.value.expose(), "exchanged");
	assert_eq!(authorized.access_token.token_type, "N_A");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn jwt_bearer_error_response_maps_to_authorization_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.body_includes("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer")
				.body_includes("assertion=");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"assertion expired\"}");
		})
		.await;
	let (manager, _) = http_manager(
		mock_registration(
			&server,
			"partner",
			GrantType::JwtBearer,
			ClientAuthMethod::ClientSecretPost,
		),
		test_token_response_client(),
	);
	let user = Principal::from_jwt(principal_jwt("noah")).expect("JWT principal should build.");
	let request = AuthorizeRequest::for_registration(registration_id("partner"), user);
	let err = manager.authorize(&request).await.expect_err("Rejected assertion should fail.");

	match err {
		Error::Authorization { grant, error } => {
			assert_eq!(grant, GrantType::JwtBearer);
			assert_eq!(error.code, OAuth2Error::INVALID_GRANT);
			assert_eq!(error.description.as_deref(), Some("assertion expired"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn refresh_invalid_grant_removes_the_stored_client() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.body_includes("grant_type=refresh_token")
				.body_includes("refresh_token=stale-refresh");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let registration = mock_registration(
		&server,
		"reports",
		GrantType::ClientCredentials,
		ClientAuthMethod::ClientSecretBasic,
	);
	let user = principal("olga");
	let attributes = Default::default();
	let (manager, repository) = http_manager(registration.clone(), test_token_response_client());

	repository
		.save(
			expired_client(Arc::new(registration), &user, Some("stale-refresh")),
			&user.name,
			&attributes,
		)
		.await
		.expect("Seeding the repository should succeed.");

	let request = AuthorizeRequest::for_registration(registration_id("reports"), user);
	let err = manager.authorize(&request).await.expect_err("Stale refresh token should fail.");

	assert!(err.invalidates_authorized_client());
	assert!(repository.is_empty());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn fake_transport_surfaces_metadata_to_the_mapper() {
	let registration = ClientRegistration::builder(
		RegistrationId::new("throttled").expect("Registration id should be valid."),
	)
	.client_id("throttled-client")
	.client_secret("throttled-secret")
	.grant_type(GrantType::ClientCredentials)
	.token_endpoint(Url::parse(TOKEN_ENDPOINT).expect("Token endpoint should parse."))
	.build()
	.expect("Registration should build.");
	let mapper = RecordingTransportErrorMapper::default();
	let client = <HttpTokenResponseClient<FakeHttpClient, RecordingTransportErrorMapper>>::new(
		FakeHttpClient { retry_after: Duration::seconds(5) },
		mapper.clone(),
	);
	let providers =
		ProviderChain::builder(TokenResponseClients::with_default(Arc::new(client)))
			.client_credentials()
			.build()
			.expect("Provider chain should build.");
	let manager = AuthorizedClientManager::new(
		Arc::new(InMemoryClientRegistrationRepository::new([registration])),
		Arc::new(InMemoryAuthorizedClientRepository::default()),
		providers,
	);
	let request = AuthorizeRequest::for_registration(registration_id("throttled"), principal("svc"));
	let err = manager.authorize(&request).await.expect_err("Request should be throttled.");

	match err {
		Error::Transient(TransientError::TokenEndpoint { status, retry_after, .. }) => {
			assert_eq!(status, Some(429));
			assert_eq!(retry_after, Some(Duration::seconds(5)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	let calls = mapper.calls.lock().clone();

	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].0, GrantType::ClientCredentials);
	assert_eq!(calls[0].1.as_ref().and_then(|meta| meta.status), Some(429));
}

#[test]
fn insecure_token_endpoints_are_rejected() {
	let err = ClientRegistration::builder(registration_id("plain"))
		.client_id("plain-client")
		.client_secret("plain-secret")
		.grant_type(GrantType::ClientCredentials)
		.token_endpoint(Url::parse("http://auth.example.com/token").expect("URL should parse."))
		.build()
		.expect_err("Plain HTTP endpoints should be rejected.");

	assert!(matches!(ConfigError::from(err), ConfigError::InvalidRegistration(_)));
}
