//! Refresh provider for expired access tokens.

// self
use crate::{
	_prelude::*,
	client::AuthorizedClient,
	context::AuthorizationContext,
	endpoint::{RefreshTokenGrantRequest, SharedTokenResponseClient},
};

/// Provider for the refresh_token grant; applies to clients of any registration grant.
#[derive(Clone)]
pub struct RefreshTokenProvider {
	client: SharedTokenResponseClient<RefreshTokenGrantRequest>,
	clock_skew: Duration,
}
impl RefreshTokenProvider {
	/// Creates a provider that refreshes through `client` with no clock skew.
	pub fn new(client: SharedTokenResponseClient<RefreshTokenGrantRequest>) -> Self {
		Self { client, clock_skew: Duration::ZERO }
	}

	/// Treats access tokens expiring within `clock_skew` as expired.
	pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
		self.clock_skew = clock_skew;

		self
	}

	/// Configured clock skew.
	pub fn clock_skew(&self) -> Duration {
		self.clock_skew
	}

	/// Applies when the existing client has a refresh token and an expired access token.
	pub fn applies(&self, context: &AuthorizationContext, now: OffsetDateTime) -> bool {
		context
			.authorized_client
			.as_ref()
			.is_some_and(|client| client.is_refreshable_at(now, self.clock_skew))
	}

	/// Refreshes the existing client's access token.
	///
	/// Scopes come from the `scope` context attribute when present; otherwise the previous
	/// grant's scopes are kept. The previous refresh token is retained when the response
	/// does not rotate it.
	pub async fn authorize(
		&self,
		context: &AuthorizationContext,
		now: OffsetDateTime,
	) -> Result<AuthorizedClient> {
		let Some((existing, refresh_token)) = context
			.authorized_client
			.as_ref()
			.and_then(|client| client.refresh_token.as_ref().map(|token| (client, token)))
		else {
			return Err(Error::client_authorization_required(
				context.registration.registration_id.clone(),
			));
		};
		let requested = context.requested_scopes().unwrap_or_default();
		let request = RefreshTokenGrantRequest {
			registration: existing.registration.clone(),
			access_token: existing.access_token.clone(),
			refresh_token: refresh_token.clone(),
			scopes: requested.clone(),
		};
		let response = self.client.token_response(&request).await?;
		let fallback =
			if requested.is_empty() { existing.access_token.scopes.clone() } else { requested };

		super::authorized_client(context, &response, &fallback, Some(refresh_token), now)
	}
}
impl Debug for RefreshTokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshTokenProvider").field("clock_skew", &self.clock_skew).finish()
	}
}
