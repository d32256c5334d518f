// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for token cache activity.
#[derive(Debug, Default)]
pub struct CacheMetrics {
	hits: AtomicU64,
	joins: AtomicU64,
	issuances: AtomicU64,
	failures: AtomicU64,
	invalidations: AtomicU64,
}
impl CacheMetrics {
	/// Returns how many calls were served from the cached token without I/O.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Returns how many calls awaited a refresh started by another caller.
	pub fn joins(&self) -> u64 {
		self.joins.load(Ordering::Relaxed)
	}

	/// Returns how many token-issuing network calls were made (retries included).
	pub fn issuances(&self) -> u64 {
		self.issuances.load(Ordering::Relaxed)
	}

	/// Returns how many refresh cycles ended in a [`CredentialError`](crate::error::CredentialError).
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns how many times a cached token was dropped after the platform rejected it.
	pub fn invalidations(&self) -> u64 {
		self.invalidations.load(Ordering::Relaxed)
	}

	pub(crate) fn record_hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_join(&self) {
		self.joins.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_issuance(&self) {
		self.issuances.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_invalidation(&self) {
		self.invalidations.fetch_add(1, Ordering::Relaxed);
	}
}
