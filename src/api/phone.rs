//! `business/getuserphonenumber` lookup.

// self
use crate::{
	_prelude::*,
	client::MiniProgramClient,
	config::ApiPrefix,
	http::ApiHttpClient,
	obs::{self, CallKind},
};

/// Phone number the user authorized the mini program to read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneInfo {
	/// Number with country prefix for non-mainland users.
	pub phone_number: String,
	/// Number without country prefix.
	pub pure_phone_number: String,
	/// Country calling code; the platform sends it as a number or a string.
	#[serde(deserialize_with = "country_code")]
	pub country_code: String,
	/// Data watermark.
	pub watermark: Watermark,
}

/// Watermark attached to decrypted user data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
	/// Unix timestamp of data retrieval.
	pub timestamp: i64,
	/// App id the data belongs to.
	pub appid: String,
}

#[derive(Deserialize)]
struct PhoneNumberResponse {
	phone_info: PhoneInfo,
}

#[derive(Serialize)]
struct PhoneNumberRequest<'a> {
	code: &'a str,
}

impl<C> MiniProgramClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Resolves the phone number authorized by `code` (from the `getPhoneNumber` button).
	pub async fn get_phone_number(&self, code: &str) -> Result<PhoneInfo> {
		obs::observe(CallKind::PhoneNumber, "get_phone_number", async move {
			let response: PhoneNumberResponse = self
				.post_authorized(ApiPrefix::Wxa, "business/getuserphonenumber", &PhoneNumberRequest {
					code,
				})
				.await?
				.decode()?;

			Ok(response.phone_info)
		})
		.await
	}
}

fn country_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: serde::Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Number(i64),
	}

	Ok(match Raw::deserialize(deserializer)? {
		Raw::Text(text) => text,
		Raw::Number(number) => number.to_string(),
	})
}
