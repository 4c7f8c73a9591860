//! Per-redirect state of an authorization_code + PKCE authorization.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{Principal, TokenSecret},
	error::{ConfigError, OAuth2Error},
	registration::{ClientRegistration, GrantType},
};

// 32 random octets encode to 43 URL-safe characters, the RFC 7636 minimum verifier length.
const ENTROPY_BYTES: usize = 32;

/// PKCE code challenge methods (RFC 7636 §4.2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// `BASE64URL(SHA256(verifier))`.
	#[default]
	S256,
}
impl PkceCodeChallengeMethod {
	/// Wire name of the method.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::S256 => "S256",
		}
	}

	fn challenge(self, verifier: &str) -> String {
		match self {
			Self::S256 => URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())),
		}
	}
}
impl Display for PkceCodeChallengeMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Pending interactive authorization for one registration and principal.
///
/// Keep the session server-side (for example in the user's web session) between the redirect
/// to [`authorize_url`](Self::authorize_url) and the callback.
#[derive(Clone)]
pub struct AuthorizationCodeSession {
	/// Registration being authorized.
	pub registration: Arc<ClientRegistration>,
	/// Principal the resulting client belongs to.
	pub principal: Principal,
	/// Opaque value that has to come back unchanged on the redirect.
	pub state: String,
	/// Redirect URI sent with the authorization request and the code exchange.
	pub redirect_uri: Url,
	/// Where to send the user agent.
	pub authorize_url: Url,
	verifier: TokenSecret,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl AuthorizationCodeSession {
	pub(super) fn start(
		registration: Arc<ClientRegistration>,
		principal: Principal,
	) -> Result<Self, ConfigError> {
		let endpoints = registration
			.uses(GrantType::AuthorizationCode)
			.then(|| registration.endpoints.authorization.clone().zip(registration.redirect_uri.clone()))
			.flatten();
		let Some((mut authorize_url, redirect_uri)) = endpoints else {
			return Err(ConfigError::UnsupportedGrant {
				registration_id: registration.registration_id.clone(),
				grant: GrantType::AuthorizationCode,
			});
		};
		let state = random_token();
		let verifier = random_token();
		let method = PkceCodeChallengeMethod::default();
		let challenge = method.challenge(&verifier);
		let scope = registration.scopes.normalized();

		authorize_url
			.query_pairs_mut()
			.append_pair("response_type", "code")
			.append_pair("client_id", &registration.client_id)
			.append_pair("redirect_uri", redirect_uri.as_str())
			.extend_pairs(Some(("scope", scope.as_str())).filter(|_| !scope.is_empty()))
			.append_pair("state", &state)
			.append_pair("code_challenge", &challenge)
			.append_pair("code_challenge_method", method.as_str());

		Ok(Self {
			registration,
			principal,
			state,
			redirect_uri,
			authorize_url,
			verifier: TokenSecret::new(verifier),
			challenge,
			method,
		})
	}

	/// PKCE code challenge sent in the authorize URL.
	pub fn code_challenge(&self) -> &str {
		&self.challenge
	}

	/// PKCE challenge method sent in the authorize URL.
	pub fn code_challenge_method(&self) -> PkceCodeChallengeMethod {
		self.method
	}

	/// Fails with `invalid_state_parameter` unless `returned_state` matches this session.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state != self.state {
			return Err(Error::Authorization {
				grant: GrantType::AuthorizationCode,
				error: OAuth2Error::new(OAuth2Error::INVALID_STATE_PARAMETER)
					.with_description("Returned state does not match the authorization request."),
			});
		}

		Ok(())
	}

	pub(super) fn code_verifier(&self) -> TokenSecret {
		self.verifier.clone()
	}
}
impl Debug for AuthorizationCodeSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationCodeSession")
			.field("registration_id", &self.registration.registration_id)
			.field("principal", &self.principal.name)
			.field("state", &self.state)
			.field("authorize_url", &self.authorize_url)
			.field("method", &self.method)
			.finish_non_exhaustive()
	}
}

fn random_token() -> String {
	let mut entropy = [0_u8; ENTROPY_BYTES];

	rand::rng().fill(&mut entropy);

	URL_SAFE_NO_PAD.encode(entropy)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::RegistrationId;

	fn registration(grant: GrantType, scopes: &[&str]) -> Arc<ClientRegistration> {
		let registration =
			ClientRegistration::builder(RegistrationId::new("google").expect("Fixture id should be valid."))
				.client_id("google-client-id")
				.client_secret("google-client-secret")
				.grant_type(grant)
				.scopes(scopes.iter().copied())
				.authorization_endpoint(
					Url::parse("https://accounts.example.com/o/oauth2/auth?prompt=consent")
						.expect("Authorization endpoint fixture should parse."),
				)
				.token_endpoint(
					Url::parse("https://accounts.example.com/token")
						.expect("Token endpoint fixture should parse."),
				)
				.redirect_uri(
					Url::parse("https://app.example.com/login/oauth2/code/google")
						.expect("Redirect URI fixture should parse."),
				)
				.build()
				.expect("Registration fixture should build.");

		Arc::new(registration)
	}

	fn start(scopes: &[&str]) -> AuthorizationCodeSession {
		AuthorizationCodeSession::start(
			registration(GrantType::AuthorizationCode, scopes),
			Principal::named("user").expect("Fixture principal should be valid."),
		)
		.expect("Session should start.")
	}

	#[test]
	fn authorize_url_keeps_existing_query_and_adds_pkce() {
		let session = start(&["openid", "profile"]);
		let query = session.authorize_url.query_pairs().into_owned().collect::<HashMap<_, _>>();
		let param = |name: &str| query.get(name).map(String::as_str);

		assert_eq!(param("prompt"), Some("consent"));
		assert_eq!(param("client_id"), Some("google-client-id"));
		assert_eq!(param("redirect_uri"), Some("https://app.example.com/login/oauth2/code/google"));
		assert_eq!(param("scope"), Some("openid profile"));
		assert_eq!(param("state"), Some(session.state.as_str()));
		assert_eq!(param("code_challenge"), Some(session.code_challenge()));
		assert_eq!(
			session.code_challenge(),
			PkceCodeChallengeMethod::S256.challenge(session.code_verifier().expose())
		);
	}

	#[test]
	fn empty_scope_sets_are_not_sent() {
		let session = start(&[]);

		assert!(session.authorize_url.query_pairs().all(|(name, _)| name != "scope"));
	}

	#[test]
	fn tokens_are_fresh_and_long_enough() {
		let first = start(&["openid"]);
		let second = start(&["openid"]);

		assert_eq!(first.state.len(), 43);
		assert_eq!(first.code_verifier().expose().len(), 43);
		assert_ne!(first.state, second.state);
		assert_ne!(first.code_challenge(), second.code_challenge());
		assert!(!format!("{first:?}").contains(first.code_verifier().expose()));
	}

	#[test]
	fn s256_matches_rfc_7636_appendix_b() {
		assert_eq!(
			PkceCodeChallengeMethod::S256.challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
			"E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
		);
	}

	#[test]
	fn mismatched_state_is_an_oauth_error() {
		let session = start(&["openid"]);

		assert!(session.validate_state(&session.state).is_ok());

		let err = session.validate_state("forged").expect_err("State mismatch should fail.");

		assert_eq!(
			err.oauth2_error().map(|error| error.code.as_str()),
			Some(OAuth2Error::INVALID_STATE_PARAMETER)
		);
	}

	#[test]
	fn sessions_require_the_authorization_code_grant() {
		let err = AuthorizationCodeSession::start(
			registration(GrantType::Password, &["openid"]),
			Principal::named("user").expect("Fixture principal should be valid."),
		)
		.expect_err("Password registrations should be rejected.");

		assert!(matches!(
			err,
			ConfigError::UnsupportedGrant { grant: GrantType::AuthorizationCode, .. }
		));
	}
}
