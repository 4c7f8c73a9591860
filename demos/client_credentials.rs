//! Authorizes a client_credentials registration against a mock token endpoint with the default
//! reqwest transport, then shows the second call reusing the stored client.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_authorizer::{
	auth::{Principal, RegistrationId},
	context::AuthorizeRequest,
	endpoint::TokenResponseClients,
	manager::AuthorizedClientManager,
	oauth::HttpTokenResponseClient,
	provider::ProviderChain,
	registration::{ClientRegistration, GrantType, InMemoryClientRegistrationRepository},
	reqwest::Client,
	store::InMemoryAuthorizedClientRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let registration = ClientRegistration::builder(RegistrationId::new("demo-service")?)
		.client_id("demo-client")
		.client_secret("super-secret")
		.grant_type(GrantType::ClientCredentials)
		.scopes(["email.read", "profile.read"])
		.token_endpoint(Url::parse(&server.url("/token"))?)
		.build()?;
	let token_client = HttpTokenResponseClient::with_reqwest_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let providers = ProviderChain::builder(TokenResponseClients::with_default(Arc::new(token_client)))
		.refresh_token()
		.client_credentials()
		.build()?;
	let manager = AuthorizedClientManager::new(
		Arc::new(InMemoryClientRegistrationRepository::new([registration])),
		Arc::new(InMemoryAuthorizedClientRepository::default()),
		providers,
	);
	let request = AuthorizeRequest::for_registration(
		RegistrationId::new("demo-service")?,
		Principal::named("service-router")?,
	);
	let first = manager.authorize(&request).await?;
	let second = manager.authorize(&request).await?;

	println!("Access token: {}.", first.access_token.value.expose());
	println!("Reused on the second call: {}.", first == second);

	token_mock.assert_async().await;

	Ok(())
}
