// self
use crate::{_prelude::*, obs::CallKind, store::StoreError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("wxa_broker.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
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

pub(crate) fn log_call_failure(kind: CallKind, err: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(call = kind.as_str(), error = %err, transient = err.is_transient(), "platform call failed");
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, err);
}

pub(crate) fn log_dispatch(method: &'static str, url: &str, status: u16) {
	#[cfg(feature = "tracing")]
	tracing::debug!(method, url, status, "platform responded");
	#[cfg(not(feature = "tracing"))]
	let _ = (method, url, status);
}

pub(crate) fn log_token_issued(app_id: &str, expires_at: OffsetDateTime, attempt: u32) {
	#[cfg(feature = "tracing")]
	tracing::debug!(app_id, %expires_at, attempt, "issued access token");
	#[cfg(not(feature = "tracing"))]
	let _ = (app_id, expires_at, attempt);
}

pub(crate) fn log_token_adopted(app_id: &str, expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(app_id, %expires_at, "adopted access token from store");
	#[cfg(not(feature = "tracing"))]
	let _ = (app_id, expires_at);
}

pub(crate) fn log_token_invalidated(app_id: &str, code: Option<i64>) {
	#[cfg(feature = "tracing")]
	tracing::info!(app_id, code, "invalidated cached access token");
	#[cfg(not(feature = "tracing"))]
	let _ = (app_id, code);
}

pub(crate) fn log_refresh_retry(app_id: &str, attempt: u32, err: &crate::error::CredentialError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(app_id, attempt, error = %err, "access token request failed; retrying");
	#[cfg(not(feature = "tracing"))]
	let _ = (app_id, attempt, err);
}

pub(crate) fn log_store_failure(operation: &'static str, err: &StoreError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(operation, error = %err, "token store operation failed");
	#[cfg(not(feature = "tracing"))]
	let _ = (operation, err);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn call_span_noop_without_tracing() {
		let _span = CallSpan::new(CallKind::Session, "test");
		// Compile-time smoke test ensures the span exists even when tracing is disabled.
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallKind::TokenRefresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
