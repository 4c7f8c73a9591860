// self
use crate::{_prelude::*, auth::RegistrationId, registration::GrantType};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedAuthorize<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedAuthorize<F> = F;

/// Span wrapping one authorize call.
#[derive(Clone, Debug)]
pub struct AuthorizeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl AuthorizeSpan {
	/// Creates a new span tagged with the registration + stage.
	pub fn new(registration: &RegistrationId, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_authorizer.authorize",
				registration = registration.as_ref(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (registration, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedAuthorize<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event naming the provider chosen for the current span.
pub fn trace_provider_selected(grant: GrantType) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(grant = grant.label(), "Authorized client provider selected.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = grant;
	}
}
