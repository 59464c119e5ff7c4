//! Thread-safe in-memory [`PetStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	pet::{Pet, PetId},
	store::{PetStore, StoreError, StoreFuture},
};

type StoreState = Arc<RwLock<Records>>;

#[derive(Debug, Default)]
struct Records {
	by_id: HashMap<PetId, Pet>,
	// Insertion order; iteration never depends on hash-map order.
	order: Vec<PetId>,
}

/// Volatile storage backend guarded by a single reader/writer lock.
///
/// Readers share the lock; every write holds it exclusively, so each read observes either all
/// or none of a completed write.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreState);
impl MemoryStore {
	/// Number of stored pets.
	pub fn len(&self) -> usize {
		self.0.read().by_id.len()
	}

	/// Returns `true` when no pets are stored.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn list_now(state: StoreState, start: Option<PetId>, limit: u32) -> Vec<Pet> {
		let mut pets: Vec<Pet> = {
			let guard = state.read();

			guard
				.order
				.iter()
				.filter(|id| start.is_none_or(|floor| **id >= floor))
				.filter_map(|id| guard.by_id.get(id).cloned())
				.collect()
		};

		pets.sort_unstable_by_key(|pet| pet.id);

		if limit > 0 {
			pets.truncate(limit as usize);
		}

		pets
	}

	fn create_now(state: StoreState, pet: Pet) -> Result<(), StoreError> {
		let mut guard = state.write();

		if guard.by_id.contains_key(&pet.id) {
			return Err(StoreError::AlreadyExists { id: pet.id });
		}

		guard.order.push(pet.id);
		guard.by_id.insert(pet.id, pet);

		Ok(())
	}

	fn get_now(state: StoreState, id: PetId) -> Result<Pet, StoreError> {
		state.read().by_id.get(&id).cloned().ok_or(StoreError::NotFound { id })
	}

	fn update_now(state: StoreState, pet: Pet) -> Result<(), StoreError> {
		let mut guard = state.write();

		match guard.by_id.get_mut(&pet.id) {
			Some(existing) => {
				existing.name = pet.name;
				existing.tag = pet.tag;

				Ok(())
			},
			None => Err(StoreError::NotFound { id: pet.id }),
		}
	}

	fn delete_now(state: StoreState, id: PetId) -> Result<(), StoreError> {
		let mut guard = state.write();

		if guard.by_id.remove(&id).is_none() {
			return Err(StoreError::NotFound { id });
		}

		guard.order.retain(|existing| *existing != id);

		Ok(())
	}
}
impl PetStore for MemoryStore {
	fn list(&self, start: Option<PetId>, limit: u32) -> StoreFuture<'_, Vec<Pet>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(Self::list_now(state, start, limit)) })
	}

	fn create(&self, pet: Pet) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move { Self::create_now(state, pet) })
	}

	fn get(&self, id: PetId) -> StoreFuture<'_, Pet> {
		let state = self.0.clone();

		Box::pin(async move { Self::get_now(state, id) })
	}

	fn update(&self, pet: Pet) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move { Self::update_now(state, pet) })
	}

	fn delete(&self, id: PetId) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move { Self::delete_now(state, id) })
	}
}
