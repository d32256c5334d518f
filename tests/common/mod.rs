//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc};
// crates.io
use parking_lot::Mutex;
use serde_json::Value;
// self
use wxa_broker::{
	ClientConfig, MiniProgramClient,
	error::TransportError,
	http::{ApiHttpClient, HttpFuture, HttpRequest, HttpResponse},
};

pub const APP_ID: &str = "wx-test-app";
pub const APP_SECRET: &str = "test-app-secret";

/// Transport that replays canned responses in order and records every request.
#[derive(Default)]
pub struct ScriptedHttpClient {
	responses: Mutex<VecDeque<HttpResponse>>,
	requests: Mutex<Vec<HttpRequest>>,
}
impl ScriptedHttpClient {
	pub fn new(responses: impl IntoIterator<Item = Value>) -> Arc<Self> {
		Arc::new(Self {
			responses: Mutex::new(
				responses.into_iter().map(|body| HttpResponse::new(200, body.to_string())).collect(),
			),
			requests: Mutex::default(),
		})
	}

	pub fn requests(&self) -> Vec<HttpRequest> {
		self.requests.lock().clone()
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().len()
	}
}
impl ApiHttpClient for ScriptedHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		self.requests.lock().push(request);

		let next = self.responses.lock().pop_front();

		Box::pin(async move {
			next.ok_or_else(|| TransportError::Io(std::io::Error::other("script exhausted")))
		})
	}
}

pub fn query_value(request: &HttpRequest, key: &str) -> Option<String> {
	request.url.query_pairs().find(|(name, _)| name == key).map(|(_, value)| value.into_owned())
}

pub fn token_body(token: &str, expires_in: i64) -> Value {
	serde_json::json!({ "access_token": token, "expires_in": expires_in })
}

pub fn scripted_config() -> ClientConfig {
	ClientConfig::builder(APP_ID, APP_SECRET)
		.api_base("https://api.example.com")
		.build()
		.expect("Scripted test config should build.")
}

pub fn scripted_client(
	http_client: Arc<ScriptedHttpClient>,
) -> MiniProgramClient<ScriptedHttpClient> {
	MiniProgramClient::with_http_client(scripted_config(), http_client)
		.expect("Scripted client should build.")
}

pub fn mock_config(base_url: &str) -> ClientConfig {
	ClientConfig::builder(APP_ID, APP_SECRET)
		.api_base(base_url)
		.build()
		.expect("Mock server config should build.")
}

#[cfg(feature = "reqwest")]
pub fn mock_client(base_url: &str) -> wxa_broker::client::ReqwestMiniProgramClient {
	MiniProgramClient::new(mock_config(base_url)).expect("Mock server client should build.")
}
