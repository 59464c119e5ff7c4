//! Builder and validation for [`ProviderDescriptor`] values.

// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	provider::{ProviderDescriptor, ProviderEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is required for the login redirect.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required for the code exchange.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// User-info endpoint is required to complete the flow.
	#[error("Missing userinfo endpoint.")]
	MissingUserinfoEndpoint,
	/// Endpoint text could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL: {url}.")]
	InvalidEndpoint {
		/// Which endpoint failed parsing.
		endpoint: &'static str,
		/// Raw endpoint text.
		url: String,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Name for the descriptor being constructed.
	pub name: String,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// User-info endpoint.
	pub userinfo_endpoint: Option<Url>,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			authorization_endpoint: None,
			token_endpoint: None,
			userinfo_endpoint: None,
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the user-info endpoint.
	pub fn userinfo_endpoint(mut self, url: Url) -> Self {
		self.userinfo_endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let userinfo =
			self.userinfo_endpoint.ok_or(ProviderDescriptorError::MissingUserinfoEndpoint)?;
		let descriptor = ProviderDescriptor {
			name: self.name,
			endpoints: ProviderEndpoints { authorization, token, userinfo },
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("userinfo", &self.endpoints.userinfo)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() == "https" || (url.scheme() == "http" && is_loopback(url)) {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(addr)) => IpAddr::V4(addr).is_loopback(),
		Some(Host::Ipv6(addr)) => IpAddr::V6(addr).is_loopback(),
		None => false,
	}
}
