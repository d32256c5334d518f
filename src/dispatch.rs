//! Request dispatcher that sends platform calls and normalizes the response envelope.
//!
//! The dispatcher is deliberately ignorant of tokens and secrets: callers hand it a fully
//! encoded URL (query included) and, for POST calls, a JSON body. The returned
//! [`ApiResponse`] separates platform failures (`errcode != 0`) from transport and decoding
//! failures, which surface as [`Error`] values.

pub mod envelope;

pub use envelope::*;

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{ApiHttpClient, HttpRequest},
	obs,
};

/// Sends requests through an [`ApiHttpClient`] and classifies the platform envelope.
pub struct Dispatcher<C>
where
	C: ?Sized + ApiHttpClient,
{
	http_client: Arc<C>,
}
impl<C> Dispatcher<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a dispatcher over the provided transport.
	pub fn new(http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into() }
	}

	/// Returns the underlying transport.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// Sends a GET when `json_body` is `None`, otherwise a POST carrying the body.
	pub async fn request(&self, url: Url, json_body: Option<Value>) -> Result<ApiResponse> {
		let request = match json_body {
			Some(body) => HttpRequest::post_json(
				url,
				serde_json::to_vec(&body).map_err(ConfigError::EncodeBody)?,
			),
			None => HttpRequest::get(url),
		};

		self.send(request).await
	}

	/// Sends a GET request.
	pub async fn get(&self, url: Url) -> Result<ApiResponse> {
		self.send(HttpRequest::get(url)).await
	}

	/// Serializes `body` and sends it as a JSON POST.
	pub async fn post_json<B>(&self, url: Url, body: &B) -> Result<ApiResponse>
	where
		B: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(body).map_err(ConfigError::EncodeBody)?;

		self.send(HttpRequest::post_json(url, body)).await
	}

	async fn send(&self, request: HttpRequest) -> Result<ApiResponse> {
		let method = request.method.as_str();
		let redacted = request.redacted_url();
		let response = self.http_client.execute(request).await?;

		obs::log_dispatch(method, &redacted, response.status);

		Ok(ApiResponse::from_http(&response)?)
	}
}
impl<C> Clone for Dispatcher<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: Arc::clone(&self.http_client) }
	}
}
impl<C> Debug for Dispatcher<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Dispatcher(..)")
	}
}
