//! Persistence contracts for authorized clients and the built-in in-memory repository.

pub mod memory;

pub use memory::InMemoryAuthorizedClientRepository;

// self
use crate::{
	_prelude::*,
	auth::{PrincipalName, RegistrationId},
	client::AuthorizedClient,
	context::RequestAttributes,
};

/// Boxed future returned by repository operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage contract for authorized clients, keyed by registration id and principal name.
///
/// Request attributes are forwarded so implementations backed by a session or request
/// scope can reach it; the in-memory repository ignores them.
pub trait AuthorizedClientRepository
where
	Self: Send + Sync,
{
	/// Loads the authorized client for the registration + principal, if present.
	fn load<'a>(
		&'a self,
		registration_id: &'a RegistrationId,
		principal: &'a PrincipalName,
		attributes: &'a RequestAttributes,
	) -> StoreFuture<'a, Option<AuthorizedClient>>;

	/// Persists or replaces the authorized client.
	fn save<'a>(
		&'a self,
		client: AuthorizedClient,
		principal: &'a PrincipalName,
		attributes: &'a RequestAttributes,
	) -> StoreFuture<'a, ()>;

	/// Removes the authorized client, returning it when one was stored.
	fn remove<'a>(
		&'a self,
		registration_id: &'a RegistrationId,
		principal: &'a PrincipalName,
		attributes: &'a RequestAttributes,
	) -> StoreFuture<'a, Option<AuthorizedClient>>;
}

/// Error type produced by [`AuthorizedClientRepository`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Key identifying a stored authorized client.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey {
	/// Registration component.
	pub registration_id: RegistrationId,
	/// Principal component.
	pub principal: PrincipalName,
}
impl StoreKey {
	/// Builds a key from its components.
	pub fn new(registration_id: &RegistrationId, principal: &PrincipalName) -> Self {
		Self { registration_id: registration_id.clone(), principal: principal.clone() }
	}
}
