//! Extractors whose rejections render as the JSON error body instead of axum's plain text.

// crates.io
use axum::{
	async_trait,
	body::Bytes,
	extract::{FromRequest, FromRequestParts, Path, Request},
	http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
// self
use crate::_prelude::*;

/// [`Path`] that rejects with [`Error::BadRequest`].
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
	S: Send + Sync,
	T: DeserializeOwned + Send,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		match Path::<T>::from_request_parts(parts, state).await {
			Ok(Path(value)) => Ok(Self(value)),
			Err(rejection) => Err(Error::BadRequest(rejection.body_text())),
		}
	}
}

/// Raw request body that rejects with [`Error::PayloadTooLarge`] or [`Error::BadRequest`].
#[derive(Debug)]
pub struct ApiBody(pub Bytes);

#[async_trait]
impl<S> FromRequest<S> for ApiBody
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		match Bytes::from_request(req, state).await {
			Ok(bytes) => Ok(Self(bytes)),
			Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
				Err(Error::PayloadTooLarge("request body too large".into())),
			Err(rejection) => Err(Error::BadRequest(rejection.body_text())),
		}
	}
}
