//! `jscode2session` login-code exchange.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	client::MiniProgramClient,
	config::{ApiPrefix, ClientConfig},
	http::ApiHttpClient,
	obs::{self, CallKind},
};

/// Session identity returned by `jscode2session`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
	/// User id scoped to this mini program.
	pub openid: String,
	/// Session key used to decrypt client-side payloads; never logged.
	pub session_key: Secret,
	/// User id scoped to the open platform account, when bound.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unionid: Option<String>,
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("openid", &self.openid)
			.field("session_key", &"<redacted>")
			.field("unionid", &self.unionid)
			.finish()
	}
}

impl<C> MiniProgramClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Exchanges a login code obtained by the mini program for a [`Session`].
	///
	/// Signed with the app id/secret in the query string; no access token is involved, so a
	/// platform failure surfaces directly as [`Error::Upstream`].
	pub async fn code2session(&self, js_code: &str) -> Result<Session> {
		obs::observe(CallKind::Session, "code2session", async move {
			let url = session_url(self.config(), js_code)?;

			self.dispatcher().get(url).await?.into_result()?.decode()
		})
		.await
	}
}

/// Builds the `jscode2session` URL for `js_code`.
pub fn session_url(config: &ClientConfig, js_code: &str) -> Result<Url> {
	let mut url = config.endpoint(ApiPrefix::Sns, "jscode2session")?;

	url.query_pairs_mut()
		.append_pair("appid", &config.credentials.app_id)
		.append_pair("secret", config.credentials.app_secret.expose())
		.append_pair("js_code", js_code)
		.append_pair("grant_type", "authorization_code");

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn session_url_signs_with_app_secret_only() {
		let config = ClientConfig::builder("A", "S").build().expect("Config should build.");
		let url = session_url(&config, "abc").expect("Session URL should build.");

		assert_eq!(
			url.as_str(),
			"https://api.weixin.qq.com/sns/jscode2session?appid=A&secret=S&js_code=abc&grant_type=authorization_code"
		);
		assert!(!url.query_pairs().any(|(key, _)| key == "access_token"));
	}

	#[test]
	fn session_url_encodes_codes() {
		let config = ClientConfig::builder("A", "S").build().expect("Config should build.");
		let url = session_url(&config, "a&b=c").expect("Session URL should build.");

		assert!(url.as_str().contains("js_code=a%26b%3Dc"));
	}

	#[test]
	fn session_decodes_optional_unionid() {
		let session: Session =
			serde_json::from_str(r#"{"openid":"o1","session_key":"k1"}"#).expect("Session should decode.");

		assert_eq!(session.openid, "o1");
		assert_eq!(session.session_key.expose(), "k1");
		assert!(session.unionid.is_none());
		assert!(!format!("{session:?}").contains("k1"));
	}
}
