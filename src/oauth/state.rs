//! CSRF state tokens.

// std
use std::hint::black_box;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
// self
use crate::_prelude::*;

/// Entropy carried by every state token.
pub const STATE_TOKEN_BYTES: usize = 32;

/// Single-use CSRF token bound to one login attempt.
#[derive(Clone)]
pub struct StateToken {
	value: String,
	issued_at: OffsetDateTime,
}
impl StateToken {
	/// Draws [`STATE_TOKEN_BYTES`] bytes from the thread-local CSPRNG and encodes them as
	/// URL-safe base64 without padding.
	pub fn generate() -> Self {
		let mut bytes = [0_u8; STATE_TOKEN_BYTES];

		rand::rng().fill_bytes(&mut bytes);

		Self { value: URL_SAFE_NO_PAD.encode(bytes), issued_at: OffsetDateTime::now_utc() }
	}

	/// Encoded token, as placed in the cookie and the `state` parameter.
	pub fn as_str(&self) -> &str {
		&self.value
	}

	/// Issuance timestamp.
	pub fn issued_at(&self) -> OffsetDateTime {
		self.issued_at
	}
}
impl Debug for StateToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StateToken")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

/// Compares two byte strings without branching on their contents.
///
/// A length mismatch returns early; equal-length inputs always touch every byte. Each byte pair
/// passes through [`black_box`] so the fold cannot be rewritten into an early-exit comparison.
/// This is best-effort: `black_box` is an optimization barrier, not a timing guarantee.
pub fn constant_time_eq(expected: &[u8], candidate: &[u8]) -> bool {
	if expected.len() != candidate.len() {
		return false;
	}

	let diff = expected
		.iter()
		.zip(candidate)
		.fold(0_u8, |acc, (a, b)| acc | black_box(black_box(*a) ^ black_box(*b)));

	black_box(diff) == 0
}
