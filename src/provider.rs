//! Identity-provider descriptors.
//!
//! A [`ProviderDescriptor`] carries the validated endpoint set the OAuth exchange talks to.
//! [`ProviderDescriptor::google`] describes Google; tests and alternate deployments build their
//! own through [`ProviderDescriptorBuilder`].

pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the login redirect targets.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// User-info endpoint queried with the issued access token.
	pub userinfo: Url,
}

/// Immutable provider descriptor consumed by the OAuth exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor name, used in logs.
	pub name: String,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided name.
	pub fn builder(name: impl Into<String>) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(name)
	}

	/// Google's published OAuth 2.0 endpoints.
	pub fn google() -> Result<Self, ProviderDescriptorError> {
		let parse = |endpoint: &'static str, raw: &str| {
			Url::parse(raw).map_err(|_| ProviderDescriptorError::InvalidEndpoint {
				endpoint,
				url: raw.to_owned(),
			})
		};

		Self::builder("google")
			.authorization_endpoint(parse("authorization", GOOGLE_AUTHORIZATION_ENDPOINT)?)
			.token_endpoint(parse("token", GOOGLE_TOKEN_ENDPOINT)?)
			.userinfo_endpoint(parse("userinfo", GOOGLE_USERINFO_ENDPOINT)?)
			.build()
	}
}
