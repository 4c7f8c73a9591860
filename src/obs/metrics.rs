// self
use crate::{obs::AuthorizeOutcome, registration::GrantType};

/// Records an authorize outcome via the global metrics recorder (when enabled).
///
/// Calls where no provider applied are labeled with the registration's grant.
pub fn record_authorize_outcome(grant: GrantType, outcome: AuthorizeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_authorizer_authorize_total",
			"grant" => grant.label(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}
