//! Shows the manager asking for interactive authorization, then starting an
//! authorization_code + PKCE session whose state the redirect handler validates.

// std
use std::{collections::HashMap, sync::Arc};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_authorizer::{
	auth::{Principal, RegistrationId},
	authorization_code::AuthorizationCodeFlow,
	context::AuthorizeRequest,
	endpoint::TokenResponseClients,
	error::Error,
	manager::AuthorizedClientManager,
	oauth::ReqwestTokenResponseClient,
	provider::ProviderChain,
	registration::{ClientRegistration, GrantType, InMemoryClientRegistrationRepository},
	store::InMemoryAuthorizedClientRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let registration_id = RegistrationId::new("demo-portal")?;
	let registration = ClientRegistration::builder(registration_id.clone())
		.client_id("demo-client")
		.client_secret("demo-secret")
		.grant_type(GrantType::AuthorizationCode)
		.scopes(["openid", "profile"])
		.authorization_endpoint(Url::parse("https://provider.example.com/authorize")?)
		.token_endpoint(Url::parse("https://provider.example.com/token")?)
		.redirect_uri(Url::parse("https://app.example.com/oauth/callback")?)
		.build()?;
	let clients =
		TokenResponseClients::with_default(Arc::new(ReqwestTokenResponseClient::default()));
	let manager = AuthorizedClientManager::new(
		Arc::new(InMemoryClientRegistrationRepository::new([registration])),
		Arc::new(InMemoryAuthorizedClientRepository::default()),
		ProviderChain::with_all_grants(clients.clone())?,
	);
	let principal = Principal::named("user-123")?;
	let request = AuthorizeRequest::for_registration(registration_id.clone(), principal.clone());

	match manager.authorize(&request).await {
		Err(Error::ClientAuthorizationRequired { error, .. }) =>
			println!("Manager reported {error}; starting the redirect."),
		other => println!("Unexpected result: {other:?}."),
	}

	let flow = AuthorizationCodeFlow::new(manager, &clients)?;
	let session = flow.start_authorization(&registration_id, principal)?;

	println!("Send your user to {}.", &session.authorize_url);
	println!(
		"PKCE challenge ({:?}): {}.",
		session.code_challenge_method(),
		session.code_challenge()
	);

	let mut sessions = HashMap::new();

	sessions.insert(session.state.clone(), session.clone());

	// The redirect handler looks the session up by the returned `state`.
	let returned_state = session.state.clone();

	if let Some(stashed) = sessions.remove(&returned_state) {
		stashed.validate_state(&returned_state)?;
		println!("Validated state for principal {}.", &stashed.principal.name);
		println!("Pass the session and code to AuthorizationCodeFlow::complete_authorization.");
	} else {
		eprintln!("State `{returned_state}` was not recognized.");
	}

	Ok(())
}
