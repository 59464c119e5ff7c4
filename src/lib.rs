//! A small pets HTTP service: interchangeable in-memory and PostgreSQL stores behind one
//! pagination contract, plus a CSRF-safe Google authorization-code handshake mounted on the
//! same router.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod pagination;
pub mod pet;
pub mod provider;
pub mod server;
pub mod service;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use axum::{
		Router,
		body::{Body, to_bytes},
		http::{Request, Response},
	};
	// self
	use crate::{
		api::{self, AppState},
		config::{OAuthConfig, StateCookieConfig},
		oauth::OAuthExchange,
		provider::ProviderDescriptor,
		service::PetService,
		store::{MemoryStore, PetStore},
	};

	/// Client identifier used by OAuth fixtures.
	pub const TEST_CLIENT_ID: &str = "client-it";
	/// Client secret used by OAuth fixtures.
	pub const TEST_CLIENT_SECRET: &str = "secret-it";
	/// Redirect URL used by OAuth fixtures.
	pub const TEST_REDIRECT_URL: &str = "https://app.example.com/auth/google/callback";

	/// OAuth configuration pointing at the fixture client.
	pub fn test_oauth_config() -> OAuthConfig {
		OAuthConfig {
			enabled: true,
			client_id: TEST_CLIENT_ID.into(),
			client_secret: TEST_CLIENT_SECRET.into(),
			redirect_url: TEST_REDIRECT_URL.into(),
			scopes: vec!["openid".into(), "email".into()],
			state_cookie: StateCookieConfig::default(),
			..OAuthConfig::default()
		}
	}

	/// Builds a provider descriptor whose endpoints live under `base` (typically an `httpmock`
	/// server URL).
	pub fn test_provider(base: &str) -> ProviderDescriptor {
		let endpoint = |path: &str| {
			Url::parse(&format!("{}{path}", base.trim_end_matches('/')))
				.expect("Mock provider endpoint should parse successfully.")
		};

		ProviderDescriptor::builder("mock-google")
			.authorization_endpoint(endpoint("/authorize"))
			.token_endpoint(endpoint("/token"))
			.userinfo_endpoint(endpoint("/userinfo"))
			.build()
			.expect("Mock provider descriptor should build successfully.")
	}

	/// Constructs an [`OAuthExchange`] against the provider mounted under `base`.
	pub fn build_test_exchange(base: &str) -> OAuthExchange {
		OAuthExchange::new(&test_oauth_config())
			.expect("OAuth fixture configuration should be valid.")
			.with_provider(test_provider(base))
	}

	/// Builds a router backed by a fresh [`MemoryStore`] and no OAuth routes.
	pub fn build_test_app() -> (Router, Arc<MemoryStore>) {
		let store = Arc::new(MemoryStore::default());
		let router = build_test_app_with_store(store.clone(), None);

		(router, store)
	}

	/// Builds a router over the provided store and optional OAuth exchange.
	pub fn build_test_app_with_store(
		store: Arc<dyn PetStore>,
		oauth: Option<OAuthExchange>,
	) -> Router {
		let pets = PetService::new(store);

		api::router(AppState::new(pets, oauth.map(Arc::new)))
	}

	/// Shorthand for a bodiless `GET` request.
	pub fn get_request(uri: &str) -> Request<Body> {
		Request::builder()
			.method("GET")
			.uri(uri)
			.body(Body::empty())
			.expect("GET request fixture should build successfully.")
	}

	/// Shorthand for a JSON `POST` request.
	pub fn post_json_request(uri: &str, body: impl Into<String>) -> Request<Body> {
		Request::builder()
			.method("POST")
			.uri(uri)
			.header("content-type", "application/json")
			.body(Body::from(body.into()))
			.expect("POST request fixture should build successfully.")
	}

	/// Collects a response body into bytes.
	pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
		to_bytes(response.into_body(), usize::MAX)
			.await
			.expect("Response body should be readable.")
			.to_vec()
	}

	/// Collects a response body and parses it as JSON.
	pub async fn body_json(response: Response<Body>) -> serde_json::Value {
		let bytes = body_bytes(response).await;

		serde_json::from_slice(&bytes).expect("Response body should be valid JSON.")
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;

// Used by the `petstore` binary only.
use clap as _;
use color_eyre as _;
// Used by integration tests only.
#[cfg(test)]
use {httpmock as _, petstore as _, tower as _};
