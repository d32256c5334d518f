//! Demonstrates the login, phone-number, and scheme helpers against a local mock platform
//! using the default reqwest transport.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use wxa_broker::{
	ClientConfig, MiniProgramClient,
	api::{GenerateSchemeRequest, JumpWxa},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/cgi-bin/token");
			then.status(200).json_body(json!({ "access_token": "demo-token", "expires_in": 7200 }));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/sns/jscode2session");
			then.status(200).json_body(json!({ "openid": "demo-openid", "session_key": "demo-key" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/wxa/business/getuserphonenumber");
			then.status(200).json_body(json!({
				"errcode": 0,
				"errmsg": "ok",
				"phone_info": {
					"phoneNumber": "13800000000",
					"purePhoneNumber": "13800000000",
					"countryCode": 86,
					"watermark": { "timestamp": 1700000000, "appid": "wx-demo" }
				}
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/wxa/generatescheme");
			then.status(200).json_body(json!({
				"errcode": 0,
				"errmsg": "ok",
				"openlink": "weixin://dl/business/?t=demo"
			}));
		})
		.await;

	let config = ClientConfig::builder("wx-demo", "demo-secret").api_base(&server.base_url()).build()?;
	let client = MiniProgramClient::new(config)?;
	let session = client.code2session("demo-login-code").await?;
	let phone = client.get_phone_number("demo-phone-code").await?;
	let scheme = client
		.generate_scheme(
			&GenerateSchemeRequest::new(JumpWxa::path("pages/index/index")).expire_after_days(1),
		)
		.await?;

	println!("Signed in {} ({session:?}).", session.openid);
	println!("Phone number: {}.", phone.phone_number);
	println!("Scheme link: {}.", scheme.openlink);

	// Both token-authorized calls shared one access token.
	token_mock.assert_async().await;

	Ok(())
}
