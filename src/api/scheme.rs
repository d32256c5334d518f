//! `generatescheme` deep-link generation.

// self
use crate::{
	_prelude::*,
	client::MiniProgramClient,
	config::ApiPrefix,
	http::ApiHttpClient,
	obs::{self, CallKind},
};

/// Target page for a scheme jump.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpWxa {
	/// Page path inside the mini program; empty opens the home page.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	/// Query string passed to the page.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	/// `release`, `trial`, or `develop`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub env_version: Option<String>,
}
impl JumpWxa {
	/// Targets `path`.
	pub fn path(path: impl Into<String>) -> Self {
		Self { path: Some(path.into()), ..Default::default() }
	}

	/// Sets the page query string.
	pub fn with_query(mut self, query: impl Into<String>) -> Self {
		self.query = Some(query.into());

		self
	}

	/// Sets the mini program version to open.
	pub fn with_env_version(mut self, env_version: impl Into<String>) -> Self {
		self.env_version = Some(env_version.into());

		self
	}
}

/// Body of a `generatescheme` call.
///
/// Fields the platform adds later can be passed through [`GenerateSchemeRequest::extra`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateSchemeRequest {
	/// Jump target.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jump_wxa: Option<JumpWxa>,
	/// Whether the scheme expires.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_expire: Option<bool>,
	/// `0` for an absolute `expire_time`, `1` for a relative `expire_interval`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expire_type: Option<u8>,
	/// Absolute expiry as a Unix timestamp.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expire_time: Option<i64>,
	/// Relative expiry in days.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expire_interval: Option<u32>,
	/// Additional fields forwarded verbatim.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl GenerateSchemeRequest {
	/// Creates a request that jumps to `jump_wxa`.
	pub fn new(jump_wxa: JumpWxa) -> Self {
		Self { jump_wxa: Some(jump_wxa), ..Default::default() }
	}

	/// Expires the scheme `days` after generation.
	pub fn expire_after_days(mut self, days: u32) -> Self {
		self.is_expire = Some(true);
		self.expire_type = Some(1);
		self.expire_interval = Some(days);

		self
	}

	/// Expires the scheme at `instant`.
	pub fn expire_at(mut self, instant: OffsetDateTime) -> Self {
		self.is_expire = Some(true);
		self.expire_type = Some(0);
		self.expire_time = Some(instant.unix_timestamp());

		self
	}
}

/// Generated scheme link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
	/// `weixin://dl/business/?t=...` link.
	pub openlink: String,
}

impl<C> MiniProgramClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Generates a scheme link that opens the mini program from outside WeChat.
	pub async fn generate_scheme(&self, request: &GenerateSchemeRequest) -> Result<Scheme> {
		obs::observe(CallKind::GenerateScheme, "generate_scheme", async move {
			self.post_authorized(ApiPrefix::Wxa, "generatescheme", request)
				.await?
				.decode()
		})
		.await
	}
}
