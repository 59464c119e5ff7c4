//! Observability helpers for pet and OAuth operations.
//!
//! # Feature Flags
//!
//! - Spans named `petstore.operation` carry the `operation` and `stage` (call site) fields.
//! - Enable `metrics` to increment the `petstore_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// `GET /pets`.
	ListPets,
	/// `POST /pets`.
	CreatePet,
	/// `GET /pets/{petId}`.
	GetPet,
	/// Login redirect issuance.
	OAuthLogin,
	/// Callback validation and code exchange.
	OAuthCallback,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::ListPets => "list_pets",
			OperationKind::CreatePet => "create_pet",
			OperationKind::GetPet => "get_pet",
			OperationKind::OAuthLogin => "oauth_login",
			OperationKind::OAuthCallback => "oauth_callback",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}

	/// Maps a result onto its terminal outcome.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { Outcome::Success } else { Outcome::Failure }
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
