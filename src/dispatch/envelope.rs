//! Platform response envelope (`errcode`/`errmsg`) classification.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ApiError, DecodeError},
	http::HttpResponse,
};

const ERRCODE: &str = "errcode";
const ERRMSG: &str = "errmsg";

/// Normalized platform response.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse {
	/// `errcode` absent or `0`.
	Success(Payload),
	/// Non-zero `errcode`.
	Failure(ApiError),
}
impl ApiResponse {
	/// Classifies a raw HTTP response.
	pub fn from_http(response: &HttpResponse) -> Result<Self, DecodeError> {
		let status = response.status;
		let mut de = serde_json::Deserializer::from_slice(&response.body);
		let value: Value = match serde_path_to_error::deserialize(&mut de) {
			Ok(value) => value,
			Err(_) if !response.is_success() => return Err(DecodeError::UnexpectedStatus { status }),
			Err(source) => return Err(DecodeError::Json { source, status }),
		};
		let mut body = match value {
			Value::Object(map) => map,
			_ if !response.is_success() => return Err(DecodeError::UnexpectedStatus { status }),
			other => return Err(DecodeError::NotAnObject { found: json_type(&other), status }),
		};
		let code = match body.remove(ERRCODE) {
			None | Some(Value::Null) => 0,
			Some(Value::Number(number)) =>
				number.as_i64().ok_or(DecodeError::InvalidErrcode { status })?,
			Some(_) => return Err(DecodeError::InvalidErrcode { status }),
		};
		let message = match body.remove(ERRMSG) {
			Some(Value::String(message)) => message,
			_ => String::new(),
		};

		if code != 0 {
			return Ok(Self::Failure(ApiError { code, message }));
		}
		if !response.is_success() {
			return Err(DecodeError::UnexpectedStatus { status });
		}

		Ok(Self::Success(Payload(body)))
	}

	/// Converts the response into a `Result`, surfacing failures as [`Error::Upstream`].
	pub fn into_result(self) -> Result<Payload> {
		match self {
			Self::Success(payload) => Ok(payload),
			Self::Failure(err) => Err(Error::Upstream(err)),
		}
	}

	/// Returns the failure code, if any.
	pub fn error_code(&self) -> Option<i64> {
		match self {
			Self::Success(_) => None,
			Self::Failure(err) => Some(err.code),
		}
	}
}

/// Success body with the envelope fields stripped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload(Map<String, Value>);
impl Payload {
	/// Wraps an already stripped JSON object.
	pub fn new(fields: Map<String, Value>) -> Self {
		Self(fields)
	}

	/// Returns a field by name.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Borrows the payload fields.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	/// Returns the payload fields.
	pub fn into_inner(self) -> Map<String, Value> {
		self.0
	}

	/// Deserializes the payload into an endpoint-specific type.
	pub fn decode<T>(self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		serde_path_to_error::deserialize(Value::Object(self.0))
			.map_err(|source| DecodeError::Payload(source).into())
	}
}

fn json_type(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn classify(status: u16, body: &str) -> Result<ApiResponse, DecodeError> {
		ApiResponse::from_http(&HttpResponse::new(status, body.as_bytes().to_vec()))
	}

	#[test]
	fn absent_or_zero_errcode_is_success_without_envelope_fields() {
		let response = classify(200, r#"{"openid":"o1","session_key":"k1"}"#)
			.expect("Plain payload should classify.");

		match response {
			ApiResponse::Success(payload) => {
				assert_eq!(payload.get("openid"), Some(&Value::from("o1")));
				assert_eq!(payload.as_map().len(), 2);
			},
			other => panic!("Unexpected response: {other:?}."),
		}

		let response = classify(200, r#"{"errcode":0,"errmsg":"ok","openlink":"weixin://dl"}"#)
			.expect("Zero errcode should classify.");
		let payload = response.into_result().expect("Zero errcode should be a success.");

		assert!(payload.get(ERRCODE).is_none());
		assert!(payload.get(ERRMSG).is_none());
		assert_eq!(payload.get("openlink"), Some(&Value::from("weixin://dl")));
	}

	#[test]
	fn non_zero_errcode_is_failure() {
		let response = classify(200, r#"{"errcode":40029,"errmsg":"invalid code"}"#)
			.expect("Error envelope should classify.");

		assert_eq!(response.error_code(), Some(40029));
		assert_eq!(response, ApiResponse::Failure(ApiError::new(40029, "invalid code")));

		let response =
			classify(200, r#"{"errcode":-1}"#).expect("Envelope without errmsg should classify.");

		assert_eq!(response, ApiResponse::Failure(ApiError::new(-1, "")));
	}

	#[test]
	fn malformed_bodies_are_decode_errors() {
		assert!(matches!(classify(200, "<html>"), Err(DecodeError::Json { status: 200, .. })));
		assert!(matches!(
			classify(200, "[1,2]"),
			Err(DecodeError::NotAnObject { found: "array", status: 200 })
		));
		assert!(matches!(
			classify(200, r#"{"errcode":"oops"}"#),
			Err(DecodeError::InvalidErrcode { status: 200 })
		));
	}

	#[test]
	fn error_statuses_require_an_envelope() {
		assert!(matches!(
			classify(502, "Bad Gateway"),
			Err(DecodeError::UnexpectedStatus { status: 502 })
		));
		assert!(matches!(classify(500, "{}"), Err(DecodeError::UnexpectedStatus { status: 500 })));
		assert_eq!(
			classify(503, r#"{"errcode":-1,"errmsg":"system error"}"#)
				.expect("Error statuses with an envelope should classify."),
			ApiResponse::Failure(ApiError::new(-1, "system error"))
		);
	}

	#[test]
	fn payload_decode_reports_field_path() {
		#[derive(Debug, Deserialize)]
		struct Shape {
			#[allow(dead_code)]
			openlink: String,
		}

		let payload = Payload::new(
			serde_json::from_str(r#"{"openlink": 5}"#).expect("Fixture JSON should parse."),
		);
		let err = payload.decode::<Shape>().expect_err("Wrong field type should fail.");

		match err {
			Error::Decode(DecodeError::Payload(source)) =>
				assert_eq!(source.path().to_string(), "openlink"),
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
