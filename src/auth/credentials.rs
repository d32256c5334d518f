//! Static app credentials issued by the platform.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// App id/secret pair used for session exchange and access-token issuance.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
	/// Mini program app id (`appid`).
	pub app_id: String,
	/// Mini program app secret (`secret`); never logged.
	pub app_secret: Secret,
}
impl Credentials {
	/// Creates a credential pair.
	pub fn new(app_id: impl Into<String>, app_secret: impl Into<Secret>) -> Self {
		Self { app_id: app_id.into(), app_secret: app_secret.into() }
	}

	/// Rejects empty fields.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.app_id.trim().is_empty() {
			return Err(ConfigError::MissingCredential { field: "app_id" });
		}
		if self.app_secret.expose().trim().is_empty() {
			return Err(ConfigError::MissingCredential { field: "app_secret" });
		}

		Ok(())
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("app_id", &self.app_id)
			.field("app_secret", &"<redacted>")
			.finish()
	}
}
