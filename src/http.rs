//! HTTP transport for token endpoint calls.
//!
//! Token response clients never talk to an HTTP stack directly: they ask a [`TokenHttpClient`]
//! for a handle bound to a fresh [`ResponseCapture`], hand that handle to `oauth2`, and read
//! the captured status and `Retry-After` hint afterwards to classify failures.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Transport that executes token requests and reports response metadata.
///
/// One instance is shared by every grant, so it has to be `Send + Sync + 'static`; handles own
/// their state so request futures stay `Send`.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Error produced by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Per-request [`AsyncHttpClient`] handed to `oauth2`.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Returns a handle that reports into `capture`.
	///
	/// A handle must clear `capture` before sending and record into it as soon as a status
	/// line has been received.
	fn bind(&self, capture: ResponseCapture) -> Self::Handle;
}

/// Status and throttling hint of the last token endpoint response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code, when a response arrived.
	pub status: Option<u16>,
	/// `Retry-After` converted to a delay relative to the time of receipt.
	pub retry_after: Option<Duration>,
}
impl ResponseMetadata {
	/// Metadata for a response with `status` and no throttling hint.
	pub fn status(status: u16) -> Self {
		Self { status: Some(status), retry_after: None }
	}

	/// Adds a `Retry-After` delay.
	pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
		self.retry_after = Some(retry_after);

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		matches!(self.status, Some(200..=299))
	}
}

/// Cell through which a handle passes [`ResponseMetadata`] back to its token response client.
#[derive(Clone, Debug, Default)]
pub struct ResponseCapture(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseCapture {
	/// Records metadata, replacing anything captured earlier.
	pub fn record(&self, meta: ResponseMetadata) {
		self.0.lock().replace(meta);
	}

	/// Removes and returns the captured metadata.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Transport backed by reqwest.
///
/// Token endpoints are expected to answer directly; pass a [`ReqwestClient`] built with
/// `redirect::Policy::none()` to keep credentials from following redirects.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient {
	client: ReqwestClient,
}
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Uses `client` for every token request.
	pub fn new(client: ReqwestClient) -> Self {
		Self { client }
	}

	/// Underlying reqwest client.
	pub fn client(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestClient> for ReqwestHttpClient {
	fn from(client: ReqwestClient) -> Self {
		Self::new(client)
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn bind(&self, capture: ResponseCapture) -> Self::Handle {
		ReqwestHandle { client: self.client.clone(), capture }
	}
}

/// Per-request handle of [`ReqwestHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle {
	client: ReqwestClient,
	capture: ResponseCapture,
}
#[cfg(feature = "reqwest")]
impl ReqwestHandle {
	async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ReqwestError> {
		self.capture.take();

		let response = self.client.execute(request.try_into()?).await?;
		let status = response.status();
		let headers = response.headers().clone();
		let mut meta = ResponseMetadata::status(status.as_u16());

		if let Some(delay) = retry_after(&headers, OffsetDateTime::now_utc()) {
			meta = meta.with_retry_after(delay);
		}

		self.capture.record(meta);

		let body = response.bytes().await?;
		let mut converted = HttpResponse::new(body.to_vec());

		*converted.status_mut() = status;
		*converted.headers_mut() = headers;

		Ok(converted)
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.execute(request).await.map_err(|e| HttpClientError::Reqwest(Box::new(e)))
		})
	}
}

// Accepts delta-seconds or an HTTP date; dates in the past yield no hint.
#[cfg(feature = "reqwest")]
fn retry_after(headers: &HeaderMap, received_at: OffsetDateTime) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	match value.parse::<u32>() {
		Ok(seconds) => Some(Duration::seconds(i64::from(seconds))),
		Err(_) => {
			let at = OffsetDateTime::parse(value, &Rfc2822).ok()?;

			Some(at - received_at).filter(|delay| delay.is_positive())
		},
	}
}
