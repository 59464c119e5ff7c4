//! Google sign-in handlers.

// crates.io
use axum::{
	Json,
	extract::{RawQuery, State},
	http::{
		HeaderMap, HeaderValue, StatusCode,
		header::{LOCATION, SET_COOKIE},
	},
	response::{IntoResponse, Response},
};
// self
use crate::{
	_prelude::*,
	api::AppState,
	oauth::{CallbackParams, OAuthExchange, read_cookie},
};

/// `GET /auth/google/login`: 302 to the provider with a fresh state cookie.
pub async fn login(State(state): State<AppState>) -> Result<Response> {
	let redirect = exchange(&state)?.login()?;
	let location = header_value(redirect.location.as_str())?;
	let cookie = header_value(&redirect.set_cookie)?;
	let mut response = StatusCode::FOUND.into_response();

	response.headers_mut().insert(LOCATION, location);
	response.headers_mut().append(SET_COOKIE, cookie);

	Ok(response)
}

/// `GET /auth/google/callback`: validates state, exchanges the code, returns user info.
pub async fn callback(
	State(state): State<AppState>,
	RawQuery(query): RawQuery,
	headers: HeaderMap,
) -> Result<Response> {
	let exchange = exchange(&state)?;
	let params = CallbackParams::from_query(query.as_deref().unwrap_or_default());
	let cookie = read_cookie(&headers, &exchange.state_cookie().name);
	let outcome = exchange.callback(&params, cookie.as_deref()).await;
	let mut response = match outcome.result {
		Ok(document) => Json(document).into_response(),
		Err(e) => e.into_response(),
	};

	if let Some(clear) = outcome.clear_cookie {
		response.headers_mut().append(SET_COOKIE, header_value(&clear)?);
	}

	Ok(response)
}

fn exchange(state: &AppState) -> Result<&OAuthExchange> {
	state.oauth.as_deref().ok_or_else(|| Error::NotFound("google oauth is not enabled".into()))
}

fn header_value(value: &str) -> Result<HeaderValue> {
	HeaderValue::from_str(value).map_err(|e| Error::internal("failed to build oauth response", e))
}
