//! Pet handlers. Query parsing lives here; everything else is delegated to
//! [`crate::service::PetService`].

// crates.io
use axum::{
	Json,
	extract::{RawQuery, State},
	http::{HeaderName, HeaderValue, StatusCode},
	response::{IntoResponse, Response},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	api::{
		AppState, NEXT_PAGE_HEADER,
		extract::{ApiBody, ApiPath},
	},
	pet::{Pet, PetId},
};

/// `GET /pets?limit=<int>&after=<int>`.
pub async fn list_pets(State(state): State<AppState>, RawQuery(query): RawQuery) -> Result<Response> {
	let query = query.unwrap_or_default();
	let limit = int_param(&query, "limit")?;
	let after = int_param(&query, "after")?;
	let page = state.pets.list_pets(limit, after).await?;
	let mut response = Json(page.items).into_response();

	if let Some(next) = page.next {
		let value = HeaderValue::from_str(&next.to_string())
			.map_err(|e| Error::internal("failed to list pets", e))?;

		response.headers_mut().insert(HeaderName::from_static(NEXT_PAGE_HEADER), value);
	}

	Ok(response)
}

/// `POST /pets`.
pub async fn create_pet(
	State(state): State<AppState>,
	ApiBody(body): ApiBody,
) -> Result<StatusCode> {
	state.pets.create_pet(&body).await?;

	Ok(StatusCode::CREATED)
}

/// `GET /pets/:pet_id`.
pub async fn get_pet(
	State(state): State<AppState>,
	ApiPath(pet_id): ApiPath<String>,
) -> Result<Json<Pet>> {
	Ok(Json(state.pets.get_pet(&pet_id).await?))
}

// The first occurrence wins; empty values count as absent.
fn int_param(query: &str, name: &str) -> Result<Option<PetId>> {
	let Some(raw) = form_urlencoded::parse(query.as_bytes())
		.find(|(key, _)| key == name)
		.map(|(_, value)| value.into_owned())
		.filter(|value| !value.is_empty())
	else {
		return Ok(None);
	};

	raw.parse::<i64>()
		.map(Some)
		.map_err(|_| Error::BadRequest(format!("{name} must be an integer")))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn int_param_parses_first_occurrence() {
		assert_eq!(int_param("limit=5&limit=9", "limit").ok().flatten(), Some(5));
		assert_eq!(int_param("after=", "after").ok().flatten(), None);
		assert_eq!(int_param("", "limit").ok().flatten(), None);
		assert!(matches!(
			int_param("limit=ten", "limit"),
			Err(Error::BadRequest(ref message)) if message == "limit must be an integer"
		));
	}
}
