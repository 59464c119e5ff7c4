//! Status mapping and the JSON error body.

// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
// self
use crate::_prelude::*;

/// JSON body returned for every failed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
	/// HTTP status code, repeated in the body.
	pub code: u16,
	/// Caller-safe description.
	pub message: String,
}

impl Error {
	/// HTTP status the error maps to.
	pub fn status(&self) -> StatusCode {
		match self {
			Error::BadRequest(_) | Error::Rejected(_) => StatusCode::BAD_REQUEST,
			Error::Conflict(_) => StatusCode::CONFLICT,
			Error::NotFound(_) => StatusCode::NOT_FOUND,
			Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
			Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
			Error::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
			Error::Upstream { .. } => StatusCode::BAD_GATEWAY,
			Error::Internal { .. } | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();

		match &self {
			Error::Upstream { source, .. } | Error::Internal { source, .. } => {
				let detail = source.as_ref().map(|source| source.to_string()).unwrap_or_default();

				tracing::error!(status = status.as_u16(), error = %self, source = %detail, "request failed");
			},
			Error::Config(e) => tracing::error!(error = %e, "configuration error surfaced at runtime"),
			Error::Rejected(reason) => tracing::warn!(%reason, "oauth callback rejected"),
			_ => tracing::debug!(status = status.as_u16(), error = %self, "request rejected"),
		}

		let message = match &self {
			Error::Config(_) => "internal server error".to_owned(),
			_ => self.to_string(),
		};

		(status, Json(ApiError { code: status.as_u16(), message })).into_response()
	}
}
