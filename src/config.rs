//! Client configuration: API prefixes, app credentials, and token-cache policy.
//!
//! [`ClientConfig`] is immutable once built. It can be assembled in code through
//! [`ClientConfig::builder`] or deserialized from any `serde` source, in which case every
//! field except the credentials falls back to the platform defaults:
//!
//! ```
//! let config: wxa_broker::ClientConfig = serde_json::from_str(
//! 	r#"{ "app_id": "wx123", "app_secret": "secret", "safety_margin_secs": 120 }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.sns_prefix.as_str(), "https://api.weixin.qq.com/sns/");
//! ```

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	error::ConfigError,
};

/// Default prefix for session endpoints (`jscode2session`).
pub const DEFAULT_SNS_PREFIX: &str = "https://api.weixin.qq.com/sns/";
/// Default prefix for mini program endpoints (`generatescheme`, `business/...`).
pub const DEFAULT_WXA_PREFIX: &str = "https://api.weixin.qq.com/wxa/";
/// Default prefix for the access-token endpoint (`token`).
pub const DEFAULT_CGI_PREFIX: &str = "https://api.weixin.qq.com/cgi-bin/";
/// Platform error codes that signal an invalid or expired access token.
///
/// 40001: invalid credential; 40014: invalid access_token; 42001: access_token expired.
pub const DEFAULT_TOKEN_ERROR_CODES: [i64; 3] = [40001, 40014, 42001];

/// API prefix selector used when resolving endpoint URLs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiPrefix {
	/// Session endpoints.
	Sns,
	/// Mini program endpoints.
	Wxa,
	/// Access-token endpoint.
	Cgi,
}
impl ApiPrefix {
	/// Returns a stable label used in errors and spans.
	pub const fn as_str(self) -> &'static str {
		match self {
			ApiPrefix::Sns => "sns",
			ApiPrefix::Wxa => "wxa",
			ApiPrefix::Cgi => "cgi",
		}
	}
}

/// Validated client configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "ClientConfigBuilder")]
pub struct ClientConfig {
	/// App id/secret pair.
	pub credentials: Credentials,
	/// Base URL for session endpoints; always ends with `/`.
	pub sns_prefix: Url,
	/// Base URL for mini program endpoints; always ends with `/`.
	pub wxa_prefix: Url,
	/// Base URL for the access-token endpoint; always ends with `/`.
	pub cgi_prefix: Url,
	/// Tokens are refreshed once `now >= expires_at - safety_margin`.
	pub safety_margin: Duration,
	/// `errcode` values that invalidate the cached access token.
	pub token_error_codes: BTreeSet<i64>,
	/// Total attempts for a token refresh; only transport failures are retried.
	pub credential_attempts: u32,
}
impl ClientConfig {
	/// Default refresh safety margin.
	pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::seconds(300);
	/// Default total attempts for a token refresh.
	pub const DEFAULT_CREDENTIAL_ATTEMPTS: u32 = 2;

	/// Starts a builder seeded with platform defaults.
	pub fn builder(app_id: impl Into<String>, app_secret: impl Into<Secret>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(app_id, app_secret)
	}

	/// Returns the configured base URL for `prefix`.
	pub fn prefix(&self, prefix: ApiPrefix) -> &Url {
		match prefix {
			ApiPrefix::Sns => &self.sns_prefix,
			ApiPrefix::Wxa => &self.wxa_prefix,
			ApiPrefix::Cgi => &self.cgi_prefix,
		}
	}

	/// Resolves `path` against the base URL for `prefix`.
	pub fn endpoint(&self, prefix: ApiPrefix, path: &str) -> Result<Url, ConfigError> {
		self.prefix(prefix)
			.join(path)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}

	/// Returns `true` when `code` signals an invalid or expired access token.
	pub fn is_token_error(&self, code: i64) -> bool {
		self.token_error_codes.contains(&code)
	}
}
impl TryFrom<ClientConfigBuilder> for ClientConfig {
	type Error = ConfigError;

	fn try_from(builder: ClientConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

/// Builder (and deserialization shape) for [`ClientConfig`].
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfigBuilder {
	app_id: String,
	app_secret: Secret,
	#[serde(default = "default_sns_prefix")]
	sns_prefix: String,
	#[serde(default = "default_wxa_prefix")]
	wxa_prefix: String,
	#[serde(default = "default_cgi_prefix")]
	cgi_prefix: String,
	#[serde(default = "default_safety_margin_secs")]
	safety_margin_secs: i64,
	#[serde(default = "default_token_error_codes")]
	token_error_codes: BTreeSet<i64>,
	#[serde(default = "default_credential_attempts")]
	credential_attempts: u32,
}
impl ClientConfigBuilder {
	fn new(app_id: impl Into<String>, app_secret: impl Into<Secret>) -> Self {
		Self {
			app_id: app_id.into(),
			app_secret: app_secret.into(),
			sns_prefix: default_sns_prefix(),
			wxa_prefix: default_wxa_prefix(),
			cgi_prefix: default_cgi_prefix(),
			safety_margin_secs: default_safety_margin_secs(),
			token_error_codes: default_token_error_codes(),
			credential_attempts: default_credential_attempts(),
		}
	}

	/// Overrides the session endpoint prefix.
	pub fn sns_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.sns_prefix = prefix.into();

		self
	}

	/// Overrides the mini program endpoint prefix.
	pub fn wxa_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.wxa_prefix = prefix.into();

		self
	}

	/// Overrides the access-token endpoint prefix.
	pub fn cgi_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.cgi_prefix = prefix.into();

		self
	}

	/// Points every prefix at one host, keeping the platform's path layout
	/// (`sns/`, `wxa/`, `cgi-bin/`). Useful for proxies and mock servers.
	pub fn api_base(self, base: &str) -> Self {
		let base = base.trim_end_matches('/');

		self.sns_prefix(format!("{base}/sns/"))
			.wxa_prefix(format!("{base}/wxa/"))
			.cgi_prefix(format!("{base}/cgi-bin/"))
	}

	/// Overrides the refresh safety margin (defaults to five minutes).
	pub fn safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin_secs = margin.whole_seconds();

		self
	}

	/// Replaces the set of `errcode` values that invalidate the cached token.
	pub fn token_error_codes(mut self, codes: impl IntoIterator<Item = i64>) -> Self {
		self.token_error_codes = codes.into_iter().collect();

		self
	}

	/// Overrides the total number of token refresh attempts (defaults to 2).
	pub fn credential_attempts(mut self, attempts: u32) -> Self {
		self.credential_attempts = attempts;

		self
	}

	/// Validates the builder and produces a [`ClientConfig`].
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let credentials = Credentials::new(self.app_id, self.app_secret);

		credentials.validate()?;

		if self.safety_margin_secs < 0 {
			return Err(ConfigError::NegativeSafetyMargin);
		}
		if self.credential_attempts == 0 {
			return Err(ConfigError::ZeroCredentialAttempts);
		}

		Ok(ClientConfig {
			credentials,
			sns_prefix: parse_prefix(ApiPrefix::Sns, &self.sns_prefix)?,
			wxa_prefix: parse_prefix(ApiPrefix::Wxa, &self.wxa_prefix)?,
			cgi_prefix: parse_prefix(ApiPrefix::Cgi, &self.cgi_prefix)?,
			safety_margin: Duration::seconds(self.safety_margin_secs),
			token_error_codes: self.token_error_codes,
			credential_attempts: self.credential_attempts,
		})
	}
}

fn parse_prefix(prefix: ApiPrefix, raw: &str) -> Result<Url, ConfigError> {
	let mut url = Url::parse(raw.trim())
		.map_err(|source| ConfigError::InvalidPrefix { prefix: prefix.as_str(), source })?;

	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::UnsupportedScheme {
			prefix: prefix.as_str(),
			scheme: url.scheme().to_owned(),
		});
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url.set_query(None);
	url.set_fragment(None);

	Ok(url)
}

fn default_sns_prefix() -> String {
	DEFAULT_SNS_PREFIX.into()
}

fn default_wxa_prefix() -> String {
	DEFAULT_WXA_PREFIX.into()
}

fn default_cgi_prefix() -> String {
	DEFAULT_CGI_PREFIX.into()
}

fn default_safety_margin_secs() -> i64 {
	ClientConfig::DEFAULT_SAFETY_MARGIN.whole_seconds()
}

fn default_token_error_codes() -> BTreeSet<i64> {
	DEFAULT_TOKEN_ERROR_CODES.into_iter().collect()
}

fn default_credential_attempts() -> u32 {
	ClientConfig::DEFAULT_CREDENTIAL_ATTEMPTS
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builder_applies_platform_defaults() {
		let config =
			ClientConfig::builder("wx123", "secret").build().expect("Default config should build.");

		assert_eq!(config.sns_prefix.as_str(), DEFAULT_SNS_PREFIX);
		assert_eq!(config.wxa_prefix.as_str(), DEFAULT_WXA_PREFIX);
		assert_eq!(config.cgi_prefix.as_str(), DEFAULT_CGI_PREFIX);
		assert_eq!(config.safety_margin, Duration::minutes(5));
		assert_eq!(config.credential_attempts, 2);
		assert!(config.is_token_error(40001));
		assert!(config.is_token_error(42001));
		assert!(!config.is_token_error(40029));
	}

	#[test]
	fn prefixes_gain_trailing_slash_and_join_paths() {
		let config = ClientConfig::builder("wx123", "secret")
			.api_base("http://127.0.0.1:8080/")
			.wxa_prefix("http://127.0.0.1:8080/wxa")
			.build()
			.expect("Local config should build.");

		assert_eq!(config.wxa_prefix.as_str(), "http://127.0.0.1:8080/wxa/");
		assert_eq!(
			config
				.endpoint(ApiPrefix::Wxa, "business/getuserphonenumber")
				.expect("Endpoint should resolve.")
				.as_str(),
			"http://127.0.0.1:8080/wxa/business/getuserphonenumber"
		);
		assert_eq!(config.cgi_prefix.as_str(), "http://127.0.0.1:8080/cgi-bin/");
	}

	#[test]
	fn builder_rejects_invalid_values() {
		assert!(matches!(
			ClientConfig::builder("", "secret").build(),
			Err(ConfigError::MissingCredential { field: "app_id" })
		));
		assert!(matches!(
			ClientConfig::builder("wx123", "secret").sns_prefix("ftp://example.com/").build(),
			Err(ConfigError::UnsupportedScheme { prefix: "sns", .. })
		));
		assert!(matches!(
			ClientConfig::builder("wx123", "secret").cgi_prefix("not a url").build(),
			Err(ConfigError::InvalidPrefix { prefix: "cgi", .. })
		));
		assert!(matches!(
			ClientConfig::builder("wx123", "secret").credential_attempts(0).build(),
			Err(ConfigError::ZeroCredentialAttempts)
		));
		assert!(matches!(
			ClientConfig::builder("wx123", "secret").safety_margin(Duration::seconds(-1)).build(),
			Err(ConfigError::NegativeSafetyMargin)
		));
	}

	#[test]
	fn deserializes_with_defaults_and_overrides() {
		let config: ClientConfig = serde_json::from_str(
			r#"{
				"app_id": "wx123",
				"app_secret": "secret",
				"safety_margin_secs": 60,
				"token_error_codes": [40001]
			}"#,
		)
		.expect("Config JSON should deserialize.");

		assert_eq!(config.credentials.app_id, "wx123");
		assert_eq!(config.safety_margin, Duration::seconds(60));
		assert!(config.is_token_error(40001));
		assert!(!config.is_token_error(42001));
		assert_eq!(config.wxa_prefix.as_str(), DEFAULT_WXA_PREFIX);

		let err = serde_json::from_str::<ClientConfig>(r#"{ "app_id": "wx123", "app_secret": "" }"#)
			.expect_err("Blank secrets should fail validation.");

		assert!(err.to_string().contains("app_secret"));
	}
}
