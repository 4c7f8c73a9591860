//! Optional observability helpers for authorize calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `oauth2_authorizer.authorize` with the `registration`
//!   and `stage` fields, plus a debug event when a provider is selected.
//! - Enable `metrics` to increment the `oauth2_authorizer_authorize_total` counter for every
//!   attempt and its result, labeled by `grant` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each authorize call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthorizeOutcome {
	/// A provider was selected and is about to run.
	Attempt,
	/// The provider produced a new authorized client.
	Success,
	/// The provider failed; the error was propagated to the caller.
	Failure,
	/// No provider applied and the existing client was returned.
	Unchanged,
	/// No provider applied and no client exists.
	AuthorizationRequired,
}
impl AuthorizeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthorizeOutcome::Attempt => "attempt",
			AuthorizeOutcome::Success => "success",
			AuthorizeOutcome::Failure => "failure",
			AuthorizeOutcome::Unchanged => "unchanged",
			AuthorizeOutcome::AuthorizationRequired => "authorization_required",
		}
	}
}
impl Display for AuthorizeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
