//! Access token model and lifecycle helpers.

// self
use crate::{_prelude::*, auth::Secret};

/// Lifecycle status of an [`AccessToken`] relative to a safety margin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Valid and outside the safety margin; safe to hand out.
	Fresh,
	/// Still valid, but inside the safety margin; refresh before use.
	Expiring,
	/// Past its expiry instant.
	Expired,
}

/// Short-lived bearer credential issued by the platform.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Token value sent as the `access_token` query parameter.
	pub value: Secret,
	/// Instant the token was obtained.
	pub issued_at: OffsetDateTime,
	/// Instant after which the platform rejects the token.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a token that expires `expires_in` after `issued_at`.
	///
	/// # Panics
	///
	/// Panics when the expiry instant is out of range; use [`AccessToken::checked_new`] for
	/// lifetimes that come off the wire.
	pub fn new(value: impl Into<Secret>, issued_at: OffsetDateTime, expires_in: Duration) -> Self {
		Self { value: value.into(), issued_at, expires_at: issued_at + expires_in }
	}

	/// Like [`AccessToken::new`], but returns `None` when the expiry instant is out of range.
	pub fn checked_new(
		value: impl Into<Secret>,
		issued_at: OffsetDateTime,
		expires_in: Duration,
	) -> Option<Self> {
		let expires_at = issued_at.checked_add(expires_in)?;

		Some(Self { value: value.into(), issued_at, expires_at })
	}

	/// Computes the status at `instant`, treating the last `margin` before expiry as expiring.
	pub fn status_at(&self, instant: OffsetDateTime, margin: Duration) -> TokenStatus {
		if instant >= self.expires_at {
			return TokenStatus::Expired;
		}
		match self.expires_at.checked_sub(margin) {
			Some(fresh_until) if instant < fresh_until => TokenStatus::Fresh,
			_ => TokenStatus::Expiring,
		}
	}

	/// Returns `true` while `instant < expires_at - margin`.
	pub fn is_fresh_at(&self, instant: OffsetDateTime, margin: Duration) -> bool {
		matches!(self.status_at(instant, margin), TokenStatus::Fresh)
	}

	/// Returns `true` once `instant >= expires_at`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Remaining lifetime at `instant`, clamped to zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn token() -> AccessToken {
		AccessToken::new(
			"token",
			macros::datetime!(2025-01-01 00:00 UTC),
			Duration::seconds(7200),
		)
	}

	#[test]
	fn status_transitions_respect_margin() {
		let token = token();
		let margin = Duration::minutes(5);

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 02:00 UTC));
		assert_eq!(
			token.status_at(macros::datetime!(2025-01-01 01:54:59 UTC), margin),
			TokenStatus::Fresh
		);
		assert_eq!(
			token.status_at(macros::datetime!(2025-01-01 01:55 UTC), margin),
			TokenStatus::Expiring
		);
		assert_eq!(
			token.status_at(macros::datetime!(2025-01-01 02:00 UTC), margin),
			TokenStatus::Expired
		);
	}

	#[test]
	fn zero_margin_keeps_token_fresh_until_expiry() {
		let token = token();

		assert!(token.is_fresh_at(macros::datetime!(2025-01-01 01:59:59 UTC), Duration::ZERO));
		assert!(!token.is_fresh_at(macros::datetime!(2025-01-01 02:00 UTC), Duration::ZERO));
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 02:00 UTC)));
	}

	#[test]
	fn remaining_lifetime_is_clamped() {
		let token = token();

		assert_eq!(
			token.remaining_at(macros::datetime!(2025-01-01 01:00 UTC)),
			Duration::hours(1)
		);
		assert_eq!(token.remaining_at(macros::datetime!(2025-01-02 00:00 UTC)), Duration::ZERO);
	}

	#[test]
	fn out_of_range_lifetimes_are_rejected() {
		let issued_at = macros::datetime!(2025-01-01 00:00 UTC);

		assert!(AccessToken::checked_new("token", issued_at, Duration::seconds(i64::MAX)).is_none());
		assert_eq!(
			AccessToken::checked_new("token", issued_at, Duration::seconds(7200))
				.map(|token| token.expires_at),
			Some(macros::datetime!(2025-01-01 02:00 UTC))
		);
	}

	#[test]
	fn debug_redacts_value() {
		assert!(!format!("{:?}", token()).contains("\"token\""));
	}
}
