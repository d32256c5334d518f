//! Thread-safe in-memory [`TokenStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Secret},
	store::{StoreFuture, TokenStore},
};

type StoreMap = Arc<RwLock<HashMap<String, AccessToken>>>;

/// Storage backend that keeps tokens in-process, shareable between clients via `clone`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns the number of stored tokens.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn invalidate_now(map: &StoreMap, app_id: &str, stale: &Secret) -> bool {
		let mut guard = map.write();

		match guard.get(app_id) {
			Some(current) if current.value == *stale => {
				guard.remove(app_id);

				true
			},
			_ => false,
		}
	}
}
impl TokenStore for MemoryStore {
	fn load<'a>(&'a self, app_id: &'a str) -> StoreFuture<'a, Option<AccessToken>> {
		let token = self.0.read().get(app_id).cloned();

		Box::pin(async move { Ok(token) })
	}

	fn save<'a>(&'a self, app_id: &'a str, token: AccessToken) -> StoreFuture<'a, ()> {
		self.0.write().insert(app_id.to_owned(), token);

		Box::pin(async move { Ok(()) })
	}

	fn invalidate<'a>(&'a self, app_id: &'a str, stale: &'a Secret) -> StoreFuture<'a, bool> {
		let removed = Self::invalidate_now(&self.0, app_id, stale);

		Box::pin(async move { Ok(removed) })
	}
}
