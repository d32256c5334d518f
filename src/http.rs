//! Transport primitives for platform calls.
//!
//! [`ApiHttpClient`] is the client's only dependency on an HTTP stack. The crate ships
//! [`ReqwestHttpClient`] (behind the default `reqwest` feature); downstream crates can plug in
//! their own transport, or a scripted one in tests, by implementing the trait.

// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing platform calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the
/// dispatcher and the token cache, and their futures must be `Send` so refreshes can be shared
/// across tasks.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and returns the raw response.
	///
	/// Non-success HTTP statuses are returned as responses, not errors; only failures to reach
	/// the platform map to [`TransportError`].
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// HTTP verb used by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// Query-only call.
	Get,
	/// Call with a JSON body.
	Post,
}
impl HttpMethod {
	/// Returns the canonical method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request handed to an [`ApiHttpClient`].
#[derive(Clone)]
pub struct HttpRequest {
	/// HTTP verb.
	pub method: HttpMethod,
	/// Fully encoded URL, query included.
	pub url: Url,
	/// JSON body, present for POST requests.
	pub json_body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Builds a GET request.
	pub fn get(url: Url) -> Self {
		Self { method: HttpMethod::Get, url, json_body: None }
	}

	/// Builds a POST request carrying an encoded JSON body.
	pub fn post_json(url: Url, body: Vec<u8>) -> Self {
		Self { method: HttpMethod::Post, url, json_body: Some(body) }
	}

	/// Returns the URL with `secret` and `access_token` values masked, for logs.
	pub fn redacted_url(&self) -> String {
		redact_url(&self.url)
	}
}
impl Debug for HttpRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpRequest")
			.field("method", &self.method)
			.field("url", &self.redacted_url())
			.field("json_body_len", &self.json_body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Raw response returned by an [`ApiHttpClient`].
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Masks sensitive query parameters so URLs can be logged safely.
pub fn redact_url(url: &Url) -> String {
	const SENSITIVE: [&str; 3] = ["secret", "access_token", "js_code"];

	if url.query().is_none() {
		return url.to_string();
	}

	let mut redacted = url.clone();
	let pairs: Vec<(String, String)> = url
		.query_pairs()
		.map(|(key, value)| {
			let value = if SENSITIVE.contains(&key.as_ref()) {
				"<redacted>".to_owned()
			} else {
				value.into_owned()
			};

			(key.into_owned(), value)
		})
		.collect();

	redacted.query_pairs_mut().clear().extend_pairs(pairs);

	redacted.to_string()
}

/// Thin wrapper around [`ReqwestClient`] that applies a bounded per-call timeout.
///
/// Platform endpoints answer directly; a custom [`ReqwestClient`] should not need redirect
/// following.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
	client: ReqwestClient,
	timeout: std::time::Duration,
}
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Per-call timeout applied unless overridden.
	pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, timeout: Self::DEFAULT_TIMEOUT }
	}

	/// Overrides the per-call timeout.
	pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Returns the per-call timeout.
	pub fn timeout(&self) -> std::time::Duration {
		self.timeout
	}
}
#[cfg(feature = "reqwest")]
impl Default for ReqwestHttpClient {
	fn default() -> Self {
		Self::with_client(ReqwestClient::default())
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let builder = match request.method {
				HttpMethod::Get => self.client.get(request.url),
				HttpMethod::Post => self.client.post(request.url),
			};
			let builder = match request.json_body {
				Some(body) => builder
					.header(reqwest::header::CONTENT_TYPE, "application/json")
					.body(body),
				None => builder,
			};
			let response = builder.timeout(self.timeout).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?;

			Ok(HttpResponse::new(status, body.to_vec()))
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn redaction_masks_sensitive_query_values() {
		let url = Url::parse(
			"https://api.weixin.qq.com/sns/jscode2session?appid=wx1&secret=s3&js_code=abc&grant_type=authorization_code",
		)
		.expect("Fixture URL should parse.");
		let redacted = redact_url(&url);

		assert!(redacted.contains("appid=wx1"));
		assert!(redacted.contains("grant_type=authorization_code"));
		assert!(!redacted.contains("s3"));
		assert!(!redacted.contains("abc"));
	}

	#[test]
	fn request_debug_hides_tokens() {
		let url = Url::parse("https://api.weixin.qq.com/wxa/generatescheme?access_token=live-token")
			.expect("Fixture URL should parse.");
		let request = HttpRequest::post_json(url, b"{}".to_vec());
		let rendered = format!("{request:?}");

		assert!(rendered.contains("POST") || rendered.contains("Post"));
		assert!(!rendered.contains("live-token"));
	}

	#[test]
	fn success_covers_2xx_only() {
		assert!(HttpResponse::new(200, Vec::new()).is_success());
		assert!(!HttpResponse::new(302, Vec::new()).is_success());
		assert!(!HttpResponse::new(500, Vec::new()).is_success());
	}
}
