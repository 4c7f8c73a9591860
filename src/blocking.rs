//! Synchronous facade over [`AuthorizedClientManager`].
//!
//! The facade drives the async manager to completion on the calling thread with
//! `futures::executor::block_on`, so both variants share one implementation. Token response
//! clients built on reqwest still need a Tokio reactor: call from a thread that has entered a
//! multi-threaded runtime (`Handle::enter`), and never from inside async code.

// self
use crate::{
	_prelude::*, client::AuthorizedClient, context::AuthorizeRequest,
	manager::AuthorizedClientManager,
};

/// Blocking wrapper around an [`AuthorizedClientManager`].
#[derive(Clone, Debug)]
pub struct BlockingAuthorizedClientManager(AuthorizedClientManager);
impl BlockingAuthorizedClientManager {
	/// Wraps an async manager.
	pub fn new(manager: AuthorizedClientManager) -> Self {
		Self(manager)
	}

	/// The wrapped async manager.
	pub fn inner(&self) -> &AuthorizedClientManager {
		&self.0
	}

	/// Blocking variant of [`AuthorizedClientManager::authorize`].
	pub fn authorize(&self, request: &AuthorizeRequest) -> Result<AuthorizedClient> {
		futures::executor::block_on(self.0.authorize(request))
	}

	/// Blocking variant of [`AuthorizedClientManager::authorize_at`].
	pub fn authorize_at(
		&self,
		request: &AuthorizeRequest,
		now: OffsetDateTime,
	) -> Result<AuthorizedClient> {
		futures::executor::block_on(self.0.authorize_at(request, now))
	}
}
impl From<AuthorizedClientManager> for BlockingAuthorizedClientManager {
	fn from(manager: AuthorizedClientManager) -> Self {
		Self::new(manager)
	}
}
