//! Authorize requests, authorization contexts, and context attribute mapping.
//!
//! An [`AuthorizeRequest`] is what callers hand to the manager: a target (registration id or
//! an existing [`AuthorizedClient`]), the principal, and type-erased request attributes such
//! as transport handles. The manager turns it into an immutable [`AuthorizationContext`] by
//! running the configured [`ContextAttributesMapper`], so providers only ever see plain string
//! attributes and never depend on a transport type.

// std
use std::any::Any;
// self
use crate::{
	_prelude::*,
	auth::{Principal, RegistrationId, ScopeSet},
	client::AuthorizedClient,
	registration::ClientRegistration,
};

/// Context attribute carrying the resource owner's username (password grant).
pub const USERNAME_ATTRIBUTE: &str = "username";
/// Context attribute carrying the resource owner's password (password grant).
pub const PASSWORD_ATTRIBUTE: &str = "password";
/// Context attribute carrying space-delimited scopes requested on refresh.
pub const SCOPE_ATTRIBUTE: &str = "scope";

/// String attributes exposed to providers.
pub type ContextAttributes = BTreeMap<String, String>;

/// Type-erased, request-scoped values passed through to the attribute mapper and repository.
#[derive(Clone, Default)]
pub struct RequestAttributes(HashMap<String, Arc<dyn Any + Send + Sync>>);
impl RequestAttributes {
	/// Stores a value under `key`, replacing any previous value.
	pub fn insert<T>(&mut self, key: impl Into<String>, value: T)
	where
		T: Any + Send + Sync,
	{
		self.0.insert(key.into(), Arc::new(value));
	}

	/// Returns the value under `key` when it exists and has type `T`.
	pub fn get<T>(&self, key: &str) -> Option<&T>
	where
		T: Any,
	{
		self.0.get(key).and_then(|value| value.downcast_ref::<T>())
	}

	/// Returns true if a value exists under `key`.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of stored values.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no values are stored.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for RequestAttributes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut keys = self.0.keys().collect::<Vec<_>>();

		keys.sort();

		f.debug_tuple("RequestAttributes").field(&keys).finish()
	}
}

/// What an authorize request targets.
#[derive(Clone, Debug)]
pub enum AuthorizeTarget {
	/// Authorize (or re-use) a client for a configured registration.
	Registration(RegistrationId),
	/// Re-authorize an existing client, e.g. to refresh its access token.
	AuthorizedClient(Box<AuthorizedClient>),
}

/// Input to [`AuthorizedClientManager::authorize`](crate::manager::AuthorizedClientManager::authorize).
#[derive(Clone, Debug)]
pub struct AuthorizeRequest {
	/// Registration id or existing client.
	pub target: AuthorizeTarget,
	/// Principal the client is authorized for.
	pub principal: Principal,
	/// Request-scoped attributes.
	pub attributes: RequestAttributes,
}
impl AuthorizeRequest {
	/// Targets a registration by identifier.
	pub fn for_registration(registration_id: RegistrationId, principal: Principal) -> Self {
		Self {
			target: AuthorizeTarget::Registration(registration_id),
			principal,
			attributes: RequestAttributes::default(),
		}
	}

	/// Targets an existing authorized client.
	pub fn for_client(client: AuthorizedClient, principal: Principal) -> Self {
		Self {
			target: AuthorizeTarget::AuthorizedClient(Box::new(client)),
			principal,
			attributes: RequestAttributes::default(),
		}
	}

	/// Adds a request attribute.
	pub fn with_attribute<T>(mut self, key: impl Into<String>, value: T) -> Self
	where
		T: Any + Send + Sync,
	{
		self.attributes.insert(key, value);

		self
	}

	/// Registration identifier the request resolves to.
	pub fn registration_id(&self) -> &RegistrationId {
		match &self.target {
			AuthorizeTarget::Registration(id) => id,
			AuthorizeTarget::AuthorizedClient(client) => client.registration_id(),
		}
	}
}

/// Immutable per-call input handed to providers.
#[derive(Clone, Debug)]
pub struct AuthorizationContext {
	/// Registration being authorized.
	pub registration: Arc<ClientRegistration>,
	/// Principal being authorized.
	pub principal: Principal,
	/// Previously authorized client, if any.
	pub authorized_client: Option<AuthorizedClient>,
	/// Attributes produced by the context attributes mapper.
	pub attributes: ContextAttributes,
}
impl AuthorizationContext {
	/// Assembles a context.
	pub fn new(
		registration: Arc<ClientRegistration>,
		principal: Principal,
		authorized_client: Option<AuthorizedClient>,
		attributes: ContextAttributes,
	) -> Self {
		Self { registration, principal, authorized_client, attributes }
	}

	/// Returns a non-blank attribute value.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str).filter(|value| !value.trim().is_empty())
	}

	/// Scopes requested through [`SCOPE_ATTRIBUTE`], if present.
	pub fn requested_scopes(&self) -> Option<ScopeSet> {
		self.attribute(SCOPE_ATTRIBUTE).map(ScopeSet::parse_delimited)
	}

	/// Returns `true` when there is no usable token to keep: either no previous client or
	/// an expired one that cannot be refreshed.
	pub fn needs_new_authorization(&self, now: OffsetDateTime) -> bool {
		match &self.authorized_client {
			None => true,
			Some(client) => client.refresh_token.is_none() && client.access_token.is_expired_at(now),
		}
	}
}

/// Maps an authorize request to the string attributes providers consume.
pub trait ContextAttributesMapper
where
	Self: Send + Sync,
{
	/// Produces context attributes for `request`.
	fn map_attributes(&self, request: &AuthorizeRequest) -> ContextAttributes;
}
impl<F> ContextAttributesMapper for F
where
	F: Fn(&AuthorizeRequest) -> ContextAttributes + Send + Sync,
{
	fn map_attributes(&self, request: &AuthorizeRequest) -> ContextAttributes {
		self(request)
	}
}

/// Mapper that contributes no attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyAttributesMapper;
impl ContextAttributesMapper for EmptyAttributesMapper {
	fn map_attributes(&self, _request: &AuthorizeRequest) -> ContextAttributes {
		ContextAttributes::new()
	}
}

/// Submitted form parameters, stored as a request attribute under [`FormParameters::KEY`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormParameters(pub BTreeMap<String, String>);
impl FormParameters {
	/// Request attribute key the mapper reads.
	pub const KEY: &'static str = "form_parameters";

	/// Collects parameters from key/value pairs.
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}

	fn non_blank(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str).filter(|value| !value.trim().is_empty())
	}
}

/// Surfaces `username`/`password` (only when both are non-blank) and `scope` from
/// [`FormParameters`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FormParametersMapper;
impl ContextAttributesMapper for FormParametersMapper {
	fn map_attributes(&self, request: &AuthorizeRequest) -> ContextAttributes {
		let mut attributes = ContextAttributes::new();
		let Some(form) = request.attributes.get::<FormParameters>(FormParameters::KEY) else {
			return attributes;
		};

		if let (Some(username), Some(password)) =
			(form.non_blank(USERNAME_ATTRIBUTE), form.non_blank(PASSWORD_ATTRIBUTE))
		{
			attributes.insert(USERNAME_ATTRIBUTE.into(), username.into());
			attributes.insert(PASSWORD_ATTRIBUTE.into(), password.into());
		}
		if let Some(scope) = form.non_blank(SCOPE_ATTRIBUTE) {
			attributes.insert(SCOPE_ATTRIBUTE.into(), scope.into());
		}

		attributes
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request() -> AuthorizeRequest {
		AuthorizeRequest::for_registration(
			RegistrationId::new("facebook").expect("Fixture id should be valid."),
			Principal::named("user").expect("Fixture principal should be valid."),
		)
	}

	#[test]
	fn request_attributes_are_typed() {
		let request = request().with_attribute("retries", 3_u8);

		assert_eq!(request.attributes.get::<u8>("retries"), Some(&3));
		assert_eq!(request.attributes.get::<String>("retries"), None);
		assert!(!request.attributes.contains_key("missing"));
		assert_eq!(format!("{:?}", request.attributes), "RequestAttributes([\"retries\"])");
	}

	#[test]
	fn form_mapper_requires_both_credentials() {
		let only_user = request()
			.with_attribute(FormParameters::KEY, FormParameters::from_pairs([("username", "user")]));

		assert!(FormParametersMapper.map_attributes(&only_user).is_empty());

		let blank_password = request().with_attribute(
			FormParameters::KEY,
			FormParameters::from_pairs([("username", "user"), ("password", " ")]),
		);

		assert!(FormParametersMapper.map_attributes(&blank_password).is_empty());

		let both = request().with_attribute(
			FormParameters::KEY,
			FormParameters::from_pairs([
				("username", "user"),
				("password", "password"),
				("scope", "read"),
			]),
		);
		let attributes = FormParametersMapper.map_attributes(&both);

		assert_eq!(attributes.get(USERNAME_ATTRIBUTE).map(String::as_str), Some("user"));
		assert_eq!(attributes.get(PASSWORD_ATTRIBUTE).map(String::as_str), Some("password"));
		assert_eq!(attributes.get(SCOPE_ATTRIBUTE).map(String::as_str), Some("read"));
	}

	#[test]
	fn closures_act_as_mappers() {
		let mapper = |_: &AuthorizeRequest| {
			ContextAttributes::from([(SCOPE_ATTRIBUTE.to_owned(), "read".to_owned())])
		};

		assert_eq!(mapper.map_attributes(&request()).len(), 1);
		assert!(EmptyAttributesMapper.map_attributes(&request()).is_empty());
	}
}
