//! Request semantics for the pet routes: validation, storage, and pagination.

// self
use crate::{
	_prelude::*,
	obs::{self, OperationKind, OperationSpan, Outcome},
	pagination::{self, Page, PageLimit},
	pet::{NewPet, Pet, PetId},
	store::{PetStore, StoreError},
};

/// Pet operations over an injected [`PetStore`].
#[derive(Clone)]
pub struct PetService {
	store: Arc<dyn PetStore>,
}
impl PetService {
	/// Wraps the store every operation delegates to.
	pub fn new(store: Arc<dyn PetStore>) -> Self {
		Self { store }
	}

	/// Lists pets in ascending id order.
	///
	/// `limit` is clamped to the page maximum; `after` resumes from a continuation hint and is an
	/// inclusive lower bound on the id.
	pub async fn list_pets(&self, limit: Option<i64>, after: Option<PetId>) -> Result<Page<Pet>> {
		let span = OperationSpan::new(OperationKind::ListPets, "list_pets");

		observe(OperationKind::ListPets, span.instrument(self.list_now(limit, after))).await
	}

	/// Decodes, validates, and stores a new pet.
	pub async fn create_pet(&self, payload: &[u8]) -> Result<()> {
		let span = OperationSpan::new(OperationKind::CreatePet, "create_pet");

		observe(OperationKind::CreatePet, span.instrument(self.create_now(payload))).await
	}

	/// Fetches a pet by the textual id taken from the request path.
	pub async fn get_pet(&self, id: &str) -> Result<Pet> {
		let span = OperationSpan::new(OperationKind::GetPet, "get_pet");

		observe(OperationKind::GetPet, span.instrument(self.get_now(id))).await
	}

	async fn list_now(&self, limit: Option<i64>, after: Option<PetId>) -> Result<Page<Pet>> {
		let limit =
			PageLimit::from_request(limit).map_err(|e| Error::BadRequest(e.to_string()))?;
		let records = self
			.store
			.list(after, limit.fetch_limit())
			.await
			.map_err(|e| Error::internal("failed to list pets", e))?;
		let page = pagination::paginate(limit, records, |pet| pet.id);

		tracing::debug!(returned = page.items.len(), more = page.next.is_some(), "listed pets");

		Ok(page)
	}

	async fn create_now(&self, payload: &[u8]) -> Result<()> {
		let new_pet = NewPet::from_json(payload).map_err(|e| {
			tracing::debug!(path = %e.path(), "rejected malformed pet payload");

			Error::BadRequest("invalid JSON body".into())
		})?;
		let pet = new_pet.into_pet().map_err(|e| Error::BadRequest(e.to_string()))?;
		let id = pet.id;

		match self.store.create(pet).await {
			Ok(()) => {
				tracing::info!(id, "pet created");

				Ok(())
			},
			Err(StoreError::AlreadyExists { .. }) => Err(Error::Conflict("pet already exists".into())),
			Err(e) => Err(Error::internal("failed to create pet", e)),
		}
	}

	async fn get_now(&self, id: &str) -> Result<Pet> {
		let id = id
			.parse::<PetId>()
			.map_err(|_| Error::BadRequest("petId must be an integer".into()))?;

		match self.store.get(id).await {
			Ok(pet) => Ok(pet),
			Err(StoreError::NotFound { .. }) => Err(Error::NotFound("pet not found".into())),
			Err(e) => Err(Error::internal("failed to fetch pet", e)),
		}
	}
}
impl Debug for PetService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PetService(..)")
	}
}

async fn observe<T, F>(kind: OperationKind, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	obs::record_outcome(kind, Outcome::Attempt);

	let result = fut.await;

	obs::record_outcome(kind, Outcome::of(&result));

	result
}
