//! Token request customization hooks.

// self
use crate::{
	_prelude::*,
	auth::RegistrationId,
	registration::{ClientRegistration, GrantType},
};

/// Hook that lets deployments decorate outgoing token requests.
///
/// The form is a plain `BTreeMap` so implementations stay independent of the HTTP client.
/// Override only what you need; the default does nothing.
pub trait TokenRequestStrategy
where
	Self: Send + Sync,
{
	/// Adds provider-specific form parameters (audience, resource, etc.) before dispatch.
	///
	/// Parameters the client already sends for the grant are not overwritten.
	fn augment_token_request(
		&self,
		_grant: GrantType,
		_registration: &ClientRegistration,
		_form: &mut BTreeMap<String, String>,
	) {
	}
}

/// Strategy that sends requests unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTokenRequestStrategy;
impl Display for DefaultTokenRequestStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-token-request-strategy")
	}
}
impl TokenRequestStrategy for DefaultTokenRequestStrategy {}

/// Strategy that appends fixed parameters per registration, e.g. an RFC 8707 `resource`.
#[derive(Clone, Debug, Default)]
pub struct StaticParametersStrategy {
	parameters: HashMap<RegistrationId, BTreeMap<String, String>>,
}
impl StaticParametersStrategy {
	/// Adds a parameter sent on every token request of `registration_id`.
	pub fn with_parameter(
		mut self,
		registration_id: RegistrationId,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.parameters.entry(registration_id).or_default().insert(name.into(), value.into());

		self
	}
}
impl TokenRequestStrategy for StaticParametersStrategy {
	fn augment_token_request(
		&self,
		_grant: GrantType,
		registration: &ClientRegistration,
		form: &mut BTreeMap<String, String>,
	) {
		if let Some(parameters) = self.parameters.get(&registration.registration_id) {
			for (name, value) in parameters {
				form.entry(name.clone()).or_insert_with(|| value.clone());
			}
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn static_parameters_do_not_override_existing_fields() {
		let id = RegistrationId::new("okta").expect("Fixture id should be valid.");
		let registration = ClientRegistration::builder(id.clone())
			.client_id("okta-client-id")
			.client_secret("okta-client-secret")
			.grant_type(GrantType::ClientCredentials)
			.token_endpoint(Url::parse("https://example.com/token").expect("URL"))
			.build()
			.expect("Registration fixture should build.");
		let strategy = StaticParametersStrategy::default()
			.with_parameter(id.clone(), "resource", "https://api.example.com")
			.with_parameter(id, "scope", "ignored");
		let mut form = BTreeMap::from([("scope".to_owned(), "read".to_owned())]);

		strategy.augment_token_request(GrantType::ClientCredentials, &registration, &mut form);

		assert_eq!(form.get("resource").map(String::as_str), Some("https://api.example.com"));
		assert_eq!(form.get("scope").map(String::as_str), Some("read"));
	}
}
