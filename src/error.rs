//! Service-level error types shared across the pet service, OAuth exchange, and HTTP layer.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant maps onto one HTTP status in [`crate::api`]. The `Display` text of
/// [`Error::Internal`] and [`Error::Upstream`] is a generic, caller-safe message; the
/// underlying fault is only reachable through [`StdError::source`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Malformed or invalid caller input.
	#[error("{0}")]
	BadRequest(String),
	/// CSRF state validation failed; the OAuth flow must not continue.
	#[error("{0}")]
	Rejected(String),
	/// A record with the same identity already exists.
	#[error("{0}")]
	Conflict(String),
	/// The requested record or route does not exist.
	#[error("{0}")]
	NotFound(String),
	/// The route exists but not for this method.
	#[error("{0}")]
	MethodNotAllowed(String),
	/// The request body exceeded the accepted size.
	#[error("{0}")]
	PayloadTooLarge(String),
	/// The request did not finish within the configured deadline.
	#[error("{0}")]
	Timeout(String),
	/// The identity provider failed or could not be reached.
	#[error("{message}")]
	Upstream {
		/// Caller-safe summary.
		message: String,
		/// Underlying transport or provider failure.
		#[source]
		source: Option<BoxError>,
	},
	/// Unexpected backend fault.
	#[error("{message}")]
	Internal {
		/// Caller-safe summary.
		message: String,
		/// Underlying backend failure.
		#[source]
		source: Option<BoxError>,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Builds an [`Error::Upstream`] that keeps `src` as its source.
	pub fn upstream(message: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Upstream { message: message.into(), source: Some(Box::new(src)) }
	}

	/// Builds an [`Error::Upstream`] without an underlying source.
	pub fn upstream_msg(message: impl Into<String>) -> Self {
		Self::Upstream { message: message.into(), source: None }
	}

	/// Builds an [`Error::Internal`] that keeps `src` as its source.
	pub fn internal(message: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Internal { message: message.into(), source: Some(Box::new(src)) }
	}
}

/// Configuration and validation failures raised while wiring the service.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Layered configuration sources could not be read or deserialized.
	#[error("Configuration could not be loaded.")]
	Load(#[from] config::ConfigError),
	/// A configuration value failed validation.
	#[error("Configuration value `{field}` is invalid: {reason}.")]
	Invalid {
		/// Dotted configuration key.
		field: &'static str,
		/// Human-readable reason.
		reason: String,
	},
	/// The OAuth exchange was constructed while disabled.
	#[error("Google OAuth is disabled.")]
	OAuthDisabled,
	/// A configured URL cannot be parsed.
	#[error("Configuration value `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Dotted configuration key.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The tracing subscriber could not be installed.
	#[error("Logging could not be initialized: {reason}.")]
	Logging {
		/// Human-readable reason.
		reason: String,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Provider(#[from] crate::provider::ProviderDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Shorthand for [`ConfigError::Invalid`].
	pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
		Self::Invalid { field, reason: reason.into() }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
