//! HTTP token response client.
//!
//! [`HttpTokenResponseClient`] implements [`TokenResponseClient`] for every grant request.
//! RFC 6749 grants go through the `oauth2` crate's typed requests; the JWT bearer (RFC 7523)
//! and token exchange (RFC 8693) grants, which `oauth2` does not model, are posted as
//! hand-built forms over the same [`TokenHttpClient`] transport.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, AuthType, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, HttpClientError, HttpRequest, HttpResponse, PkceCodeVerifier, RedirectUrl,
	RequestTokenError, ResourceOwnerPassword, ResourceOwnerUsername, Scope, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenType},
	http::{Method, Request, header},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{ACCESS_TOKEN_TYPE, BEARER_TOKEN_TYPE, ScopeSet, TokenSecret},
	endpoint::{
		AccessTokenResponse, AuthorizationCodeGrantRequest, ClientCredentialsGrantRequest,
		DefaultTokenRequestStrategy, JwtBearerGrantRequest, PasswordGrantRequest,
		RefreshTokenGrantRequest, TokenExchangeGrantRequest, TokenRequestStrategy,
		TokenResponseClient, TokenResponseFuture,
	},
	error::{ConfigError, OAuth2Error, TransientError, TransportError},
	http::{ResponseCapture, ResponseMetadata, TokenHttpClient},
	registration::{ClientAuthMethod, ClientRegistration, GrantType},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type Form = BTreeMap<String, String>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		grant: GrantType,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_grant: GrantType,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(meta, message),
			_ => map_unknown_transport_error(meta),
		}
	}
}

/// Token response client that talks to the registration's token endpoint over HTTP.
///
/// Client authentication follows [`ClientRegistration::client_auth_method`]. Extra form
/// parameters come from the configured [`TokenRequestStrategy`].
pub struct HttpTokenResponseClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	error_mapper: Arc<M>,
	strategy: Arc<dyn TokenRequestStrategy>,
}
impl<C, M> HttpTokenResponseClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client over `http_client` that sends requests unchanged.
	pub fn new(http_client: impl Into<Arc<C>>, error_mapper: impl Into<Arc<M>>) -> Self {
		Self {
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
			strategy: Arc::new(DefaultTokenRequestStrategy),
		}
	}

	/// Replaces the token request strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn TokenRequestStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Form parameters added by the strategy, excluding anything the grant already sends.
	fn extra_params(
		&self,
		grant: GrantType,
		registration: &ClientRegistration,
		base: &Form,
	) -> Vec<(String, String)> {
		let mut form = base.clone();

		self.strategy.augment_token_request(grant, registration, &mut form);

		form.into_iter().filter(|(name, _)| !base.contains_key(name)).collect()
	}

	fn map_request_error(
		&self,
		grant: GrantType,
		meta: Option<ResponseMetadata>,
		err: BasicRequestTokenError<HttpClientError<C::TransportError>>,
	) -> Error {
		let meta_ref = meta.as_ref();

		match err {
			RequestTokenError::ServerResponse(response) => map_server_response_error(grant, response),
			RequestTokenError::Request(error) =>
				self.error_mapper.map_transport_error(grant, meta_ref, error),
			RequestTokenError::Parse(error, _body) =>
				TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
					.into(),
			RequestTokenError::Other(message) => TransientError::TokenEndpoint {
				message,
				status: meta_status(meta_ref),
				retry_after: meta_retry_after(meta_ref),
			}
			.into(),
		}
	}

	async fn authorization_code(
		&self,
		request: &AuthorizationCodeGrantRequest,
	) -> Result<AccessTokenResponse> {
		let grant = GrantType::AuthorizationCode;
		let registration = request.registration.as_ref();
		let oauth_client = oauth_client(registration)?;
		let redirect_url = RedirectUrl::new(request.redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut base = Form::from([
			("code".to_owned(), request.code.expose().to_owned()),
			("redirect_uri".to_owned(), request.redirect_uri.to_string()),
		]);

		if let Some(verifier) = &request.code_verifier {
			base.insert("code_verifier".into(), verifier.expose().to_owned());
		}

		let extra = self.extra_params(grant, registration, &base);
		let mut token_request = oauth_client
			.exchange_code(AuthorizationCode::new(request.code.expose().to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_url));

		if let Some(verifier) = &request.code_verifier {
			token_request =
				token_request.set_pkce_verifier(PkceCodeVerifier::new(verifier.expose().to_owned()));
		}
		for (name, value) in &extra {
			token_request = token_request.add_extra_param(name, value);
		}

		let meta = ResponseCapture::default();
		let handle = self.http_client.bind(meta.clone());
		let response = token_request
			.request_async(&handle)
			.await
			.map_err(|err| self.map_request_error(grant, meta.take(), err))?;

		map_basic_token_response(&response)
	}

	async fn refresh_token(&self, request: &RefreshTokenGrantRequest) -> Result<AccessTokenResponse> {
		let grant = GrantType::RefreshToken;
		let registration = request.registration.as_ref();
		let oauth_client = oauth_client(registration)?;
		let refresh_secret =
			oauth2::RefreshToken::new(request.refresh_token.value.expose().to_owned());
		let mut base = Form::from([(
			"refresh_token".to_owned(),
			request.refresh_token.value.expose().to_owned(),
		)]);

		if !request.scopes.is_empty() {
			base.insert("scope".into(), request.scopes.normalized());
		}

		let extra = self.extra_params(grant, registration, &base);
		let mut token_request = oauth_client.exchange_refresh_token(&refresh_secret);

		for scope in request.scopes.iter() {
			token_request = token_request.add_scope(Scope::new(scope.to_owned()));
		}
		for (name, value) in &extra {
			token_request = token_request.add_extra_param(name, value);
		}

		let meta = ResponseCapture::default();
		let handle = self.http_client.bind(meta.clone());
		let response = token_request
			.request_async(&handle)
			.await
			.map_err(|err| self.map_request_error(grant, meta.take(), err))?;

		map_basic_token_response(&response)
	}

	async fn client_credentials(
		&self,
		request: &ClientCredentialsGrantRequest,
	) -> Result<AccessTokenResponse> {
		let grant = GrantType::ClientCredentials;
		let registration = request.registration.as_ref();
		let oauth_client = oauth_client(registration)?;
		let base = scope_form(&registration.scopes);
		let extra = self.extra_params(grant, registration, &base);
		let mut token_request = oauth_client.exchange_client_credentials();

		for scope in registration.scopes.iter() {
			token_request = token_request.add_scope(Scope::new(scope.to_owned()));
		}
		for (name, value) in &extra {
			token_request = token_request.add_extra_param(name, value);
		}

		let meta = ResponseCapture::default();
		let handle = self.http_client.bind(meta.clone());
		let response = token_request
			.request_async(&handle)
			.await
			.map_err(|err| self.map_request_error(grant, meta.take(), err))?;

		map_basic_token_response(&response)
	}

	async fn password(&self, request: &PasswordGrantRequest) -> Result<AccessTokenResponse> {
		let grant = GrantType::Password;
		let registration = request.registration.as_ref();
		let oauth_client = oauth_client(registration)?;
		let username = ResourceOwnerUsername::new(request.username.clone());
		let password = ResourceOwnerPassword::new(request.password.expose().to_owned());
		let mut base = scope_form(&registration.scopes);

		base.insert("username".into(), request.username.clone());
		base.insert("password".into(), request.password.expose().to_owned());

		let extra = self.extra_params(grant, registration, &base);
		let mut token_request = oauth_client.exchange_password(&username, &password);

		for scope in registration.scopes.iter() {
			token_request = token_request.add_scope(Scope::new(scope.to_owned()));
		}
		for (name, value) in &extra {
			token_request = token_request.add_extra_param(name, value);
		}

		let meta = ResponseCapture::default();
		let handle = self.http_client.bind(meta.clone());
		let response = token_request
			.request_async(&handle)
			.await
			.map_err(|err| self.map_request_error(grant, meta.take(), err))?;

		map_basic_token_response(&response)
	}

	async fn jwt_bearer(&self, request: &JwtBearerGrantRequest) -> Result<AccessTokenResponse> {
		let mut form = scope_form(&request.registration.scopes);

		form.insert("assertion".into(), request.jwt.token_value().expose().to_owned());

		self.post_form(GrantType::JwtBearer, &request.registration, form).await
	}

	async fn token_exchange(
		&self,
		request: &TokenExchangeGrantRequest,
	) -> Result<AccessTokenResponse> {
		let mut form = scope_form(&request.registration.scopes);

		form.insert("subject_token".into(), request.subject_token.value.expose().to_owned());
		form.insert("subject_token_type".into(), request.subject_token.token_type.clone());
		form.insert("requested_token_type".into(), ACCESS_TOKEN_TYPE.into());

		if let Some(actor) = &request.actor_token {
			form.insert("actor_token".into(), actor.value.expose().to_owned());
			form.insert("actor_token_type".into(), actor.token_type.clone());
		}

		self.post_form(GrantType::TokenExchange, &request.registration, form).await
	}

	/// Posts a grant the `oauth2` crate has no typed request for.
	async fn post_form(
		&self,
		grant: GrantType,
		registration: &ClientRegistration,
		mut form: Form,
	) -> Result<AccessTokenResponse> {
		form.insert("grant_type".into(), grant.as_str().into());

		let authorization = apply_client_auth(registration, &mut form);

		for (name, value) in self.extra_params(grant, registration, &form) {
			form.insert(name, value);
		}

		let body = form_urlencoded::Serializer::new(String::new()).extend_pairs(&form).finish();
		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(registration.endpoints.token.as_str())
			.header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(header::ACCEPT, "application/json");

		if let Some(value) = authorization {
			builder = builder.header(header::AUTHORIZATION, value);
		}

		let http_request: HttpRequest = builder.body(body.into_bytes()).map_err(ConfigError::from)?;
		let meta = ResponseCapture::default();
		let handle = self.http_client.bind(meta.clone());
		let response = handle
			.call(http_request)
			.await
			.map_err(|err| self.error_mapper.map_transport_error(grant, meta.take().as_ref(), err))?;

		parse_form_response(grant, &response, meta.take().as_ref())
	}
}
#[cfg(feature = "reqwest")]
impl HttpTokenResponseClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a reqwest-backed client using `client` for every call.
	pub fn with_reqwest_client(client: ReqwestClient) -> Self {
		Self::new(ReqwestHttpClient::new(client), ReqwestTransportErrorMapper)
	}
}
#[cfg(feature = "reqwest")]
impl Default for HttpTokenResponseClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	fn default() -> Self {
		Self::new(ReqwestHttpClient::default(), ReqwestTransportErrorMapper)
	}
}
impl<C, M> Debug for HttpTokenResponseClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpTokenResponseClient").finish_non_exhaustive()
	}
}

macro_rules! impl_token_response_client {
	($($request:ty => $method:ident),+ $(,)?) => {
		$(
			impl<C, M> TokenResponseClient<$request> for HttpTokenResponseClient<C, M>
			where
				C: ?Sized + TokenHttpClient,
				M: ?Sized + TransportErrorMapper<C::TransportError>,
			{
				fn token_response<'a>(&'a self, request: &'a $request) -> TokenResponseFuture<'a> {
					Box::pin(self.$method(request))
				}
			}
		)+
	};
}

impl_token_response_client! {
	AuthorizationCodeGrantRequest => authorization_code,
	RefreshTokenGrantRequest => refresh_token,
	ClientCredentialsGrantRequest => client_credentials,
	PasswordGrantRequest => password,
	JwtBearerGrantRequest => jwt_bearer,
	TokenExchangeGrantRequest => token_exchange,
}

/// Reqwest-backed [`HttpTokenResponseClient`].
#[cfg(feature = "reqwest")]
pub type ReqwestTokenResponseClient =
	HttpTokenResponseClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

#[derive(Debug, Deserialize)]
struct FormTokenResponse {
	access_token: String,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<u64>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	scope: Option<String>,
	#[serde(default)]
	issued_token_type: Option<String>,
}
impl FormTokenResponse {
	fn into_response(self) -> Result<AccessTokenResponse> {
		let token_type = match self.token_type {
			Some(token_type) if token_type.eq_ignore_ascii_case("bearer") => BEARER_TOKEN_TYPE.into(),
			Some(token_type) => token_type,
			None => BEARER_TOKEN_TYPE.into(),
		};
		let mut response = AccessTokenResponse::new(self.access_token).with_token_type(token_type);

		if let Some(expires_in) = self.expires_in {
			response = response.with_expires_in(expires_in_duration(expires_in)?);
		}
		if let Some(refresh_token) = self.refresh_token {
			response = response.with_refresh_token(refresh_token);
		}
		if let Some(scope) = self.scope {
			response = response.with_scopes(ScopeSet::parse_delimited(&scope));
		}
		if let Some(issued_token_type) = self.issued_token_type {
			response = response.with_issued_token_type(issued_token_type);
		}

		Ok(response)
	}
}

#[derive(Debug, Deserialize)]
struct FormErrorResponse {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
	#[serde(default)]
	error_uri: Option<String>,
}
impl From<FormErrorResponse> for OAuth2Error {
	fn from(response: FormErrorResponse) -> Self {
		Self { code: response.error, description: response.error_description, uri: response.error_uri }
	}
}

fn oauth_client(registration: &ClientRegistration) -> Result<ConfiguredBasicClient, ConfigError> {
	let token_url = TokenUrl::new(registration.endpoints.token.to_string())
		.map_err(|source| ConfigError::InvalidEndpoint { source })?;
	let mut oauth_client = BasicClient::new(ClientId::new(registration.client_id.clone()))
		.set_token_uri(token_url);

	if registration.client_auth_method == ClientAuthMethod::None {
		return Ok(oauth_client);
	}
	if let Some(secret) = &registration.client_secret {
		oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.expose().to_owned()));
	}
	if registration.client_auth_method == ClientAuthMethod::ClientSecretPost {
		oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
	}

	Ok(oauth_client)
}

fn scope_form(scopes: &ScopeSet) -> Form {
	let mut form = Form::new();

	if !scopes.is_empty() {
		form.insert("scope".into(), scopes.normalized());
	}

	form
}

/// Adds client credentials to `form` or returns the `Authorization` header value to send.
fn apply_client_auth(registration: &ClientRegistration, form: &mut Form) -> Option<String> {
	let secret = registration.client_secret.as_ref().map(TokenSecret::expose);

	match (registration.client_auth_method, secret) {
		(ClientAuthMethod::ClientSecretBasic, Some(secret)) => {
			let credentials =
				format!("{}:{}", form_encode(&registration.client_id), form_encode(secret));

			Some(format!("Basic {}", STANDARD.encode(credentials)))
		},
		(ClientAuthMethod::ClientSecretPost, Some(secret)) => {
			form.insert("client_id".into(), registration.client_id.clone());
			form.insert("client_secret".into(), secret.to_owned());

			None
		},
		_ => {
			form.insert("client_id".into(), registration.client_id.clone());

			None
		},
	}
}

fn form_encode(value: &str) -> String {
	form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn parse_form_response(
	grant: GrantType,
	response: &HttpResponse,
	meta: Option<&ResponseMetadata>,
) -> Result<AccessTokenResponse> {
	let status = response.status();

	if status.is_success() {
		let parsed: FormTokenResponse =
			serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(
				response.body(),
			))
			.map_err(|source| TransientError::TokenResponseParse {
				source,
				status: Some(status.as_u16()),
			})?;

		return parsed.into_response();
	}

	match serde_path_to_error::deserialize::<_, FormErrorResponse>(
		&mut serde_json::Deserializer::from_slice(response.body()),
	) {
		Ok(parsed) => Err(Error::Authorization { grant, error: parsed.into() }),
		Err(_) => Err(TransientError::TokenEndpoint {
			message: format!("HTTP {status} without an OAuth 2.0 error body"),
			status: Some(status.as_u16()),
			retry_after: meta_retry_after(meta),
		}
		.into()),
	}
}

fn map_basic_token_response(
	response: &oauth2::basic::BasicTokenResponse,
) -> Result<AccessTokenResponse> {
	let token_type = match response.token_type() {
		BasicTokenType::Bearer => BEARER_TOKEN_TYPE.to_owned(),
		other => other.as_ref().to_owned(),
	};
	let mut mapped = AccessTokenResponse::new(response.access_token().secret().as_str())
		.with_token_type(token_type);

	if let Some(expires_in) = response.expires_in() {
		mapped = mapped.with_expires_in(expires_in_duration(expires_in.as_secs())?);
	}
	if let Some(refresh_token) = response.refresh_token() {
		mapped = mapped.with_refresh_token(refresh_token.secret().as_str());
	}
	if let Some(scopes) = response.scopes() {
		let granted =
			ScopeSet::new(scopes.iter().map(|scope| scope.as_str())).map_err(ConfigError::from)?;

		mapped = mapped.with_scopes(granted);
	}

	Ok(mapped)
}

fn expires_in_duration(seconds: u64) -> Result<Duration, ConfigError> {
	let seconds = i64::try_from(seconds).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

	if seconds <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn);
	}

	Ok(Duration::seconds(seconds))
}

fn map_server_response_error(grant: GrantType, response: BasicErrorResponse) -> Error {
	let mut error = OAuth2Error::new(response.error().as_ref());

	if let Some(description) = response.error_description() {
		error = error.with_description(description.as_str());
	}
	if let Some(uri) = response.error_uri() {
		error = error.with_uri(uri.as_str());
	}

	Error::Authorization { grant, error }
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::TokenEndpoint {
			message: "Request timed out while calling the token endpoint".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(meta: Option<&ResponseMetadata>, message: impl Display) -> Error {
	TransientError::TokenEndpoint {
		message: format!("HTTP client error occurred while calling the token endpoint: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_unknown_transport_error(meta: Option<&ResponseMetadata>) -> Error {
	TransientError::TokenEndpoint {
		message: "HTTP client error occurred while calling the token endpoint".into(),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
