#![cfg(feature = "reqwest")]

mod common;

// std
use std::time::Duration as StdDuration;
// crates.io
use futures::future;
use httpmock::prelude::*;
use time::Duration;
// self
use common::*;
use wxa_broker::{
	ClientConfig, Error, MiniProgramClient,
	error::{ApiError, CredentialError},
};

const TOKEN_PATH: &str = "/cgi-bin/token";

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(TOKEN_PATH)
				.query_param("grant_type", "client_credential")
				.query_param("appid", APP_ID)
				.query_param("secret", APP_SECRET);
			then.status(200)
				.delay(StdDuration::from_millis(200))
				.json_body(token_body("shared-token", 7200));
		})
		.await;
	let client = mock_client(&server.base_url());
	let tokens = future::join_all((0..16).map(|_| client.token_cache().access_token())).await;

	for token in tokens {
		let token = token.expect("Every concurrent caller should receive the token.");

		assert_eq!(token.value.expose(), "shared-token");
	}

	token_mock.assert_calls_async(1).await;

	assert_eq!(client.token_cache().metrics().issuances(), 1);
	assert_eq!(client.token_cache().metrics().joins(), 15);
	assert!(!client.token_cache().is_refreshing());
}

#[tokio::test]
async fn fresh_token_is_reused_until_margin() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(TOKEN_PATH);
			then.status(200).json_body(token_body("long-lived", 7200));
		})
		.await;
	let client = mock_client(&server.base_url());

	for _ in 0..5 {
		let token = client.token_cache().access_token().await.expect("Token should be available.");

		assert_eq!(token.value.expose(), "long-lived");
	}

	token_mock.assert_calls_async(1).await;

	assert_eq!(client.token_cache().metrics().hits(), 4);
}

#[tokio::test]
async fn token_inside_safety_margin_is_refreshed_every_call() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(TOKEN_PATH);
			then.status(200).json_body(token_body("short-lived", 200));
		})
		.await;
	let config = ClientConfig::builder(APP_ID, APP_SECRET)
		.api_base(&server.base_url())
		.safety_margin(Duration::seconds(300))
		.build()
		.expect("Config should build.");
	let client = MiniProgramClient::new(config).expect("Client should build.");

	client.token_cache().access_token().await.expect("First refresh should succeed.");
	client.token_cache().access_token().await.expect("Second refresh should succeed.");

	token_mock.assert_calls_async(2).await;

	assert_eq!(client.token_cache().metrics().hits(), 0);
}

#[tokio::test]
async fn abandoned_waiter_does_not_cancel_refresh() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(TOKEN_PATH);
			then.status(200)
				.delay(StdDuration::from_millis(300))
				.json_body(token_body("survivor", 7200));
		})
		.await;
	let client = mock_client(&server.base_url());
	let abandoned = tokio::time::timeout(
		StdDuration::from_millis(50),
		client.token_cache().access_token(),
	)
	.await;

	assert!(abandoned.is_err(), "First waiter should time out before the token arrives.");
	assert!(client.token_cache().is_refreshing());

	let token = client
		.token_cache()
		.access_token()
		.await
		.expect("Second waiter should join the refresh left in flight.");

	assert_eq!(token.value.expose(), "survivor");

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_platform_surfaces_credential_error() {
	// Nothing listens on the discard port.
	let client = mock_client("http://127.0.0.1:9");
	let err = client
		.token_cache()
		.access_token()
		.await
		.expect_err("Unreachable token endpoint should fail.");

	assert!(matches!(err, Error::Credential(CredentialError::Request { .. })));
	assert!(err.is_transient());
	assert_eq!(client.token_cache().metrics().issuances(), 2);
	assert!(!client.token_cache().is_refreshing());

	let err = client
		.token_cache()
		.access_token()
		.await
		.expect_err("A later call should start a new refresh and fail the same way.");

	assert!(matches!(err, Error::Credential(CredentialError::Request { .. })));
	assert_eq!(client.token_cache().metrics().failures(), 2);
}

#[tokio::test]
async fn rejected_credentials_are_not_retried() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(TOKEN_PATH);
			then.status(200).json_body(serde_json::json!({
				"errcode": 40013,
				"errmsg": "invalid appid"
			}));
		})
		.await;
	let client = mock_client(&server.base_url());
	let err = client
		.token_cache()
		.access_token()
		.await
		.expect_err("Rejected credentials should fail.");

	match err {
		Error::Credential(CredentialError::Rejected(ApiError { code, .. })) =>
			assert_eq!(code, 40013),
		other => panic!("Unexpected error: {other:?}."),
	}

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn malformed_grant_is_invalid() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(TOKEN_PATH);
			then.status(200).json_body(serde_json::json!({ "access_token": "", "expires_in": 7200 }));
		})
		.await;

	let client = mock_client(&server.base_url());
	let err = client
		.token_cache()
		.access_token()
		.await
		.expect_err("Empty access token should be rejected.");

	assert!(matches!(err, Error::Credential(CredentialError::InvalidGrant { .. })));
	assert!(client.token_cache().peek().is_none());
}
