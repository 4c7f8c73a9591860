//! The authorized client manager: the single entry point that turns an [`AuthorizeRequest`]
//! into an [`AuthorizedClient`].
//!
//! One call resolves the registration, loads any stored client for the principal, maps the
//! request attributes, selects the single applicable provider, and persists what it returns.
//! Nothing is shared between calls beyond the repositories, so concurrent calls for the same
//! principal may each reach the token endpoint.

// self
use crate::{
	_prelude::*,
	client::AuthorizedClient,
	context::{
		AuthorizationContext, AuthorizeRequest, AuthorizeTarget, ContextAttributesMapper,
		EmptyAttributesMapper,
	},
	error::ConfigError,
	obs::{self, AuthorizeOutcome, AuthorizeSpan},
	provider::ProviderChain,
	registration::{ClientRegistration, ClientRegistrationRepository},
	store::AuthorizedClientRepository,
};

/// Orchestrates provider selection, repository access, and attribute mapping.
#[derive(Clone)]
pub struct AuthorizedClientManager {
	registrations: Arc<dyn ClientRegistrationRepository>,
	repository: Arc<dyn AuthorizedClientRepository>,
	providers: ProviderChain,
	attributes_mapper: Arc<dyn ContextAttributesMapper>,
	remove_on_authorization_failure: bool,
}
impl AuthorizedClientManager {
	/// Creates a manager with an empty attributes mapper that removes stored clients whose
	/// grant the authorization server rejected.
	pub fn new(
		registrations: Arc<dyn ClientRegistrationRepository>,
		repository: Arc<dyn AuthorizedClientRepository>,
		providers: ProviderChain,
	) -> Self {
		Self {
			registrations,
			repository,
			providers,
			attributes_mapper: Arc::new(EmptyAttributesMapper),
			remove_on_authorization_failure: true,
		}
	}

	/// Replaces the context attributes mapper.
	pub fn with_attributes_mapper(mut self, mapper: Arc<dyn ContextAttributesMapper>) -> Self {
		self.attributes_mapper = mapper;

		self
	}

	/// Controls whether stored clients are removed after an `invalid_grant` or
	/// `invalid_token` response.
	pub fn with_remove_on_authorization_failure(mut self, remove: bool) -> Self {
		self.remove_on_authorization_failure = remove;

		self
	}

	/// Registration lookup used by the manager.
	pub fn registrations(&self) -> &Arc<dyn ClientRegistrationRepository> {
		&self.registrations
	}

	/// Authorized client repository used by the manager.
	pub fn repository(&self) -> &Arc<dyn AuthorizedClientRepository> {
		&self.repository
	}

	/// Provider chain used by the manager.
	pub fn providers(&self) -> &ProviderChain {
		&self.providers
	}

	/// Authorizes (or re-authorizes) a client using the current time.
	pub async fn authorize(&self, request: &AuthorizeRequest) -> Result<AuthorizedClient> {
		self.authorize_at(request, OffsetDateTime::now_utc()).await
	}

	/// Authorizes (or re-authorizes) a client, evaluating token expiry at `now`.
	///
	/// Returns the stored client unchanged when no provider applies and its access token is
	/// still valid at `now`. Fails with [`Error::ClientAuthorizationRequired`] when no provider
	/// applies and nothing usable is stored.
	pub async fn authorize_at(
		&self,
		request: &AuthorizeRequest,
		now: OffsetDateTime,
	) -> Result<AuthorizedClient> {
		let span = AuthorizeSpan::new(request.registration_id(), "authorize");

		span.instrument(async {
			let (registration, existing) = self.resolve(request).await?;
			let grant = registration.grant_type;
			let attributes = self.attributes_mapper.map_attributes(request);
			let context =
				AuthorizationContext::new(registration, request.principal.clone(), existing, attributes);
			let Some(provider) = self.providers.select(&context, now)? else {
				return match context.authorized_client {
					Some(client) if !client.access_token.is_expired_at(now) => {
						obs::record_authorize_outcome(grant, AuthorizeOutcome::Unchanged);

						Ok(client)
					},
					_ => {
						obs::record_authorize_outcome(grant, AuthorizeOutcome::AuthorizationRequired);

						Err(Error::client_authorization_required(
							context.registration.registration_id.clone(),
						))
					},
				};
			};
			let grant = provider.grant_type();

			obs::trace_provider_selected(grant);
			obs::record_authorize_outcome(grant, AuthorizeOutcome::Attempt);

			match provider.authorize(&context, now).await {
				Ok(client) => {
					self.repository
						.save(client.clone(), &request.principal.name, &request.attributes)
						.await?;
					obs::record_authorize_outcome(grant, AuthorizeOutcome::Success);

					Ok(client)
				},
				Err(e) => {
					obs::record_authorize_outcome(grant, AuthorizeOutcome::Failure);

					if self.remove_on_authorization_failure
						&& context.authorized_client.is_some()
						&& e.invalidates_authorized_client()
					{
						self.repository
							.remove(
								&context.registration.registration_id,
								&request.principal.name,
								&request.attributes,
							)
							.await?;
					}

					Err(e)
				},
			}
		})
		.await
	}

	async fn resolve(
		&self,
		request: &AuthorizeRequest,
	) -> Result<(Arc<ClientRegistration>, Option<AuthorizedClient>)> {
		match &request.target {
			AuthorizeTarget::Registration(registration_id) => {
				let registration = self
					.registrations
					.find_by_registration_id(registration_id)
					.ok_or_else(|| ConfigError::UnknownRegistration {
						registration_id: registration_id.clone(),
					})?;
				let existing = self
					.repository
					.load(registration_id, &request.principal.name, &request.attributes)
					.await?;

				Ok((registration, existing))
			},
			AuthorizeTarget::AuthorizedClient(client) =>
				Ok((client.registration.clone(), Some(client.as_ref().clone()))),
		}
	}
}
impl Debug for AuthorizedClientManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizedClientManager")
			.field("providers", &self.providers)
			.field("remove_on_authorization_failure", &self.remove_on_authorization_failure)
			.finish()
	}
}
