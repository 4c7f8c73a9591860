//! Client registrations: the static descriptor of an OAuth client at one authorization server.
//!
//! `ClientRegistration` carries the client credentials, the single grant type the
//! registration is configured for, its scopes, and HTTPS endpoints. Registrations are
//! validated once by [`ClientRegistrationBuilder`] and then shared as
//! `Arc<ClientRegistration>` for the lifetime of the process.

/// Builder API for assembling registrations.
pub mod builder;
/// Grant type identifiers.
pub mod grant;
/// Registration lookup contracts.
pub mod repository;

pub use builder::*;
pub use grant::*;
pub use repository::*;

// self
use crate::{
	_prelude::*,
	auth::{RegistrationId, ScopeSet, TokenSecret},
};

/// Client authentication methods for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// Public client; only `client_id` is sent.
	None,
}
impl ClientAuthMethod {
	/// Returns the registered method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			ClientAuthMethod::ClientSecretBasic => "client_secret_basic",
			ClientAuthMethod::ClientSecretPost => "client_secret_post",
			ClientAuthMethod::None => "none",
		}
	}
}

/// Authorization server endpoints used by a registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint; required for the authorization_code grant.
	pub authorization: Option<Url>,
	/// Token endpoint used by every token exchange.
	pub token: Url,
}

/// Immutable client registration consumed by providers and token response clients.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientRegistration {
	/// Registration identifier.
	pub registration_id: RegistrationId,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret for confidential authentication methods.
	pub client_secret: Option<TokenSecret>,
	/// Token endpoint client authentication method.
	pub client_auth_method: ClientAuthMethod,
	/// Grant type this registration obtains tokens with.
	pub grant_type: GrantType,
	/// Scopes requested by default.
	pub scopes: ScopeSet,
	/// Redirect URI for the authorization_code grant.
	pub redirect_uri: Option<Url>,
	/// Authorization server endpoints.
	pub endpoints: ProviderEndpoints,
	/// Optional human-readable client name.
	pub client_name: Option<String>,
}
impl ClientRegistration {
	/// Creates a new builder for the provided identifier.
	pub fn builder(registration_id: RegistrationId) -> ClientRegistrationBuilder {
		ClientRegistrationBuilder::new(registration_id)
	}

	/// Returns `true` when the registration is configured for `grant`.
	pub fn uses(&self, grant: GrantType) -> bool {
		self.grant_type == grant
	}
}
impl Debug for ClientRegistration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientRegistration")
			.field("registration_id", &self.registration_id)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("client_auth_method", &self.client_auth_method)
			.field("grant_type", &self.grant_type)
			.field("scopes", &self.scopes)
			.field("endpoints", &self.endpoints)
			.finish()
	}
}
