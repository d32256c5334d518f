//! Storage contracts for sharing access tokens across client instances.
//!
//! The platform invalidates the previous access token whenever a new one is issued, so
//! deployments running several processes against the same app id should publish tokens
//! through a shared [`TokenStore`]. The cache consults the store before calling the token
//! endpoint and publishes every token it obtains.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Secret},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for access tokens, keyed by app id.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Fetches the token stored for `app_id`, if any.
	fn load<'a>(&'a self, app_id: &'a str) -> StoreFuture<'a, Option<AccessToken>>;

	/// Persists or replaces the token for `app_id`.
	fn save<'a>(&'a self, app_id: &'a str, token: AccessToken) -> StoreFuture<'a, ()>;

	/// Removes the token for `app_id` only if its value equals `stale`.
	///
	/// Returns `true` when a token was removed.
	fn invalidate<'a>(&'a self, app_id: &'a str, stale: &'a Secret) -> StoreFuture<'a, bool>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
