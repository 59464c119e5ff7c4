//! Pet entity and the create-payload validation rules.

// self
use crate::_prelude::*;

/// Pet identifier. Caller-supplied, non-zero, globally unique.
pub type PetId = i64;

/// A persisted pet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
	/// Caller-supplied identifier.
	pub id: PetId,
	/// Display name; never empty once persisted.
	pub name: String,
	/// Optional free-form tag. Absent tags are omitted from JSON rather than sent as `null`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tag: Option<String>,
}
impl Pet {
	/// Creates a pet without a tag.
	pub fn new(id: PetId, name: impl Into<String>) -> Self {
		Self { id, name: name.into(), tag: None }
	}

	/// Attaches a tag.
	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.tag = Some(tag.into());

		self
	}

	/// Checks the persistence invariants: `id != 0` and a non-empty `name`.
	pub fn validate(&self) -> Result<(), PetValidationError> {
		if self.id == 0 {
			return Err(PetValidationError::MissingId);
		}
		if self.name.is_empty() {
			return Err(PetValidationError::MissingName);
		}

		Ok(())
	}
}

/// Wire shape of a create request.
///
/// Missing `id`/`name` fields decode to their zero values so validation can name the missing
/// field instead of failing as a malformed body.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewPet {
	/// Requested identifier.
	#[serde(default)]
	pub id: PetId,
	/// Requested name.
	#[serde(default)]
	pub name: String,
	/// Optional tag.
	#[serde(default)]
	pub tag: Option<String>,
}
impl NewPet {
	/// Decodes a JSON payload, keeping the path of the offending field on failure.
	pub fn from_json(payload: &[u8]) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut de = serde_json::Deserializer::from_slice(payload);

		serde_path_to_error::deserialize(&mut de)
	}

	/// Validates the payload and converts it into a [`Pet`].
	pub fn into_pet(self) -> Result<Pet, PetValidationError> {
		let pet = Pet { id: self.id, name: self.name, tag: self.tag };

		pet.validate()?;

		Ok(pet)
	}
}

/// Validation failures for pet payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum PetValidationError {
	/// `id` was absent or zero.
	#[error("id is required")]
	MissingId,
	/// `name` was absent or empty.
	#[error("name is required")]
	MissingName,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn absent_tag_is_omitted_from_json() {
		let payload = serde_json::to_string(&Pet::new(7, "Rex"))
			.expect("Pet without a tag should serialize to JSON.");

		assert_eq!(payload, r#"{"id":7,"name":"Rex"}"#);

		let tagged = serde_json::to_string(&Pet::new(8, "Tom").with_tag("cat"))
			.expect("Tagged pet should serialize to JSON.");

		assert_eq!(tagged, r#"{"id":8,"name":"Tom","tag":"cat"}"#);
	}

	#[test]
	fn missing_fields_name_the_field() {
		let no_id = NewPet::from_json(br#"{"name":"Rex"}"#)
			.expect("Payload without an id should still decode.");

		assert_eq!(no_id.into_pet(), Err(PetValidationError::MissingId));

		let empty_name = NewPet::from_json(br#"{"id":3,"name":""}"#)
			.expect("Payload with an empty name should still decode.");

		assert_eq!(empty_name.into_pet(), Err(PetValidationError::MissingName));
		assert_eq!(PetValidationError::MissingName.to_string(), "name is required");
	}

	#[test]
	fn malformed_payload_reports_field_path() {
		let err = NewPet::from_json(br#"{"id":"seven","name":"Rex"}"#)
			.expect_err("A string id should be rejected.");

		assert_eq!(err.path().to_string(), "id");
	}
}
