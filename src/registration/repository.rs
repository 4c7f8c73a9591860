// self
use crate::{
	_prelude::*,
	auth::RegistrationId,
	registration::ClientRegistration,
};

/// Lookup contract for configured client registrations.
///
/// Registrations are static configuration, so lookups are synchronous.
pub trait ClientRegistrationRepository
where
	Self: Send + Sync,
{
	/// Returns the registration with the provided identifier, if configured.
	fn find_by_registration_id(&self, id: &RegistrationId) -> Option<Arc<ClientRegistration>>;
}

/// Immutable in-memory registration set.
#[derive(Clone, Debug, Default)]
pub struct InMemoryClientRegistrationRepository(Arc<HashMap<RegistrationId, Arc<ClientRegistration>>>);
impl InMemoryClientRegistrationRepository {
	/// Indexes the provided registrations; later entries replace earlier ones with the same id.
	pub fn new<I>(registrations: I) -> Self
	where
		I: IntoIterator<Item = ClientRegistration>,
	{
		let map = registrations
			.into_iter()
			.map(|registration| (registration.registration_id.clone(), Arc::new(registration)))
			.collect();

		Self(Arc::new(map))
	}

	/// Number of registrations.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no registrations are configured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over every registration.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<ClientRegistration>> {
		self.0.values()
	}
}
impl ClientRegistrationRepository for InMemoryClientRegistrationRepository {
	fn find_by_registration_id(&self, id: &RegistrationId) -> Option<Arc<ClientRegistration>> {
		self.0.get(id).cloned()
	}
}
