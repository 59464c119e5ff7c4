//! Request-scoped middleware pieces wired by [`crate::api::router`].

// std
use std::{any::Any, time::Duration as StdDuration};
// crates.io
use axum::{
	body::Body,
	extract::{Request, State},
	http,
	middleware::Next,
	response::{IntoResponse, Response},
};
use tracing::Span;
// self
use crate::{_prelude::*, api::REQUEST_ID_HEADER};

/// Fails the request with [`Error::Timeout`] once `deadline` elapses, dropping the handler future.
pub async fn enforce_deadline(
	State(deadline): State<StdDuration>,
	request: Request,
	next: Next,
) -> Response {
	match tokio::time::timeout(deadline, next.run(request)).await {
		Ok(response) => response,
		Err(_) => {
			tracing::warn!(deadline = ?deadline, "request deadline elapsed");

			Error::Timeout("request timed out".into()).into_response()
		},
	}
}

/// Turns a handler panic into the generic JSON 500.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
	let detail = panic
		.downcast_ref::<String>()
		.map(String::as_str)
		.or_else(|| panic.downcast_ref::<&str>().copied())
		.unwrap_or("non-string panic payload");

	tracing::error!(detail, "handler panicked");

	Error::Internal { message: "internal server error".into(), source: None }.into_response()
}

/// Per-request span carrying the method, path, and request id.
pub fn request_span(request: &http::Request<Body>) -> Span {
	let request_id = request
		.headers()
		.get(REQUEST_ID_HEADER)
		.and_then(|value| value.to_str().ok())
		.unwrap_or_default();

	tracing::info_span!(
		"http.request",
		method = %request.method(),
		path = request.uri().path(),
		request_id,
	)
}
