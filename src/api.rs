//! HTTP surface: the axum router, its shared state, and the JSON error body.

pub mod auth;
pub mod error;
pub mod extract;
pub mod layers;
pub mod pets;

pub use error::ApiError;

// std
use std::time::Duration as StdDuration;
// crates.io
use axum::{Router, middleware, routing::get};
use tower_http::{
	catch_panic::CatchPanicLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
// self
use crate::{_prelude::*, oauth::OAuthExchange, service::PetService};

/// Name of the continuation-hint response header.
pub const NEXT_PAGE_HEADER: &str = "x-next";
/// Request correlation header; generated when the caller sends none and echoed on the response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// State shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
	/// Pet operations.
	pub pets: Arc<PetService>,
	/// Google sign-in; `None` leaves the `/auth/google/*` routes unmounted.
	pub oauth: Option<Arc<OAuthExchange>>,
	/// Per-request deadline; `None` disables it.
	pub request_timeout: Option<StdDuration>,
}
impl AppState {
	/// Bundles the services handed to the router.
	pub fn new(pets: PetService, oauth: Option<Arc<OAuthExchange>>) -> Self {
		Self { pets: Arc::new(pets), oauth, request_timeout: None }
	}

	/// Bounds every request by `timeout`.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}
}

/// Builds the service router.
///
/// - `GET /pets`, `POST /pets`, `GET /pets/:pet_id`
/// - `GET /auth/google/login`, `GET /auth/google/callback` when OAuth is configured
///
/// Unknown routes, unsupported methods, deadline overruns, and handler panics all answer with
/// the JSON error body. Every response carries `x-request-id`.
pub fn router(state: AppState) -> Router {
	let mut router = Router::new()
		.route("/pets", get(pets::list_pets).post(pets::create_pet).fallback(method_not_allowed))
		.route("/pets/:pet_id", get(pets::get_pet).fallback(method_not_allowed));

	if state.oauth.is_some() {
		router = router
			.route("/auth/google/login", get(auth::login).fallback(method_not_allowed))
			.route("/auth/google/callback", get(auth::callback).fallback(method_not_allowed));
	}

	router = router.fallback(route_not_found);

	if let Some(deadline) = state.request_timeout {
		router = router.layer(middleware::from_fn_with_state(deadline, layers::enforce_deadline));
	}

	router
		.layer(CatchPanicLayer::custom(layers::panic_response))
		.layer(TraceLayer::new_for_http().make_span_with(layers::request_span))
		.layer(PropagateRequestIdLayer::x_request_id())
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.with_state(state)
}

async fn route_not_found() -> Error {
	Error::NotFound("route not found".into())
}

async fn method_not_allowed() -> Error {
	Error::MethodNotAllowed("method not allowed".into())
}
