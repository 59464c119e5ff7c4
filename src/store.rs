//! Storage contract and the built-in pet store implementations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PostgresStore, PostgresStoreConfig};

// self
use crate::{
	_prelude::*,
	pet::{Pet, PetId},
};

/// Boxed future returned by [`PetStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by every pet store.
///
/// Implementations must behave identically: `list` always yields ascending ids, `create` is an
/// atomic insert-if-absent, and backend-specific failures (unique violations, empty result sets)
/// are translated into [`StoreError::AlreadyExists`] / [`StoreError::NotFound`] before they
/// leave the store.
pub trait PetStore
where
	Self: Send + Sync,
{
	/// Lists pets ordered by ascending id.
	///
	/// `start` is an inclusive lower bound on the id. `limit == 0` means unbounded.
	fn list(&self, start: Option<PetId>, limit: u32) -> StoreFuture<'_, Vec<Pet>>;

	/// Inserts the pet unless a record with the same id exists.
	fn create(&self, pet: Pet) -> StoreFuture<'_, ()>;

	/// Fetches a pet by id.
	fn get(&self, id: PetId) -> StoreFuture<'_, Pet>;

	/// Replaces the name and tag of an existing pet.
	fn update(&self, pet: Pet) -> StoreFuture<'_, ()>;

	/// Removes a pet by id.
	fn delete(&self, id: PetId) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`PetStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// A record with this id already exists.
	#[error("Pet {id} already exists.")]
	AlreadyExists {
		/// Conflicting identifier.
		id: PetId,
	},
	/// No record with this id exists.
	#[error("Pet {id} was not found.")]
	NotFound {
		/// Missing identifier.
		id: PetId,
	},
	/// The backend round trip exceeded its deadline.
	#[error("Store operation `{operation}` timed out.")]
	Timeout {
		/// Operation label.
		operation: &'static str,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
