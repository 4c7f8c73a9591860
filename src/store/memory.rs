//! Thread-safe in-memory [`AuthorizedClientRepository`] for services, tests, and demos.

// self
use crate::{
	_prelude::*,
	auth::{PrincipalName, RegistrationId},
	client::AuthorizedClient,
	context::RequestAttributes,
	store::{AuthorizedClientRepository, StoreError, StoreFuture, StoreKey},
};

type ClientMap = Arc<RwLock<HashMap<StoreKey, AuthorizedClient>>>;

/// Repository that keeps authorized clients in-process.
///
/// Writes are visible to every subsequent read through any clone of the repository.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAuthorizedClientRepository(ClientMap);
impl InMemoryAuthorizedClientRepository {
	/// Number of stored clients.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn save_now(map: ClientMap, client: AuthorizedClient, principal: PrincipalName) {
		let key = StoreKey { registration_id: client.registration_id().clone(), principal };

		map.write().insert(key, client);
	}
}
impl AuthorizedClientRepository for InMemoryAuthorizedClientRepository {
	fn load<'a>(
		&'a self,
		registration_id: &'a RegistrationId,
		principal: &'a PrincipalName,
		_attributes: &'a RequestAttributes,
	) -> StoreFuture<'a, Option<AuthorizedClient>> {
		let map = self.0.clone();
		let key = StoreKey::new(registration_id, principal);

		Box::pin(async move { Ok::<_, StoreError>(map.read().get(&key).cloned()) })
	}

	fn save<'a>(
		&'a self,
		client: AuthorizedClient,
		principal: &'a PrincipalName,
		_attributes: &'a RequestAttributes,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let principal = principal.to_owned();

		Box::pin(async move {
			Self::save_now(map, client, principal);

			Ok(())
		})
	}

	fn remove<'a>(
		&'a self,
		registration_id: &'a RegistrationId,
		principal: &'a PrincipalName,
		_attributes: &'a RequestAttributes,
	) -> StoreFuture<'a, Option<AuthorizedClient>> {
		let map = self.0.clone();
		let key = StoreKey::new(registration_id, principal);

		Box::pin(async move { Ok(map.write().remove(&key)) })
	}
}
