//! Google authorization-code exchange with a CSRF-safe state cookie.
//!
//! The exchange keeps no server-side session state. [`OAuthExchange::login`] issues a fresh
//! [`StateToken`], stores it in an `HttpOnly` cookie, and redirects to the provider.
//! [`OAuthExchange::callback`] checks the echoed `state` against the cookie in constant time
//! before it ever contacts the token endpoint, then trades the code for an access token and
//! returns the provider's user-info document.

pub mod cookie;
pub mod state;

pub use self::{cookie::*, state::*};

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{
	AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RedirectUrl,
	TokenResponse, TokenUrl, basic::BasicClient,
};
use reqwest::StatusCode;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	config::{
		DEFAULT_SCOPES, DEFAULT_STATE_COOKIE_MAX_AGE, DEFAULT_STATE_COOKIE_NAME,
		DEFAULT_STATE_COOKIE_PATH, OAuthConfig, StateCookieConfig,
	},
	error::ConfigError,
	http::{ReqwestHttpClient, ResponseMetadataSlot},
	obs::{self, OperationKind, OperationSpan, Outcome},
	provider::ProviderDescriptor,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const DEFAULT_HTTP_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Query parameters the provider appends to the callback URL.
#[derive(Clone, Debug, Default)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// Echoed CSRF state.
	pub state: Option<String>,
	/// Provider-reported error code.
	pub error: Option<String>,
	/// Human-readable provider error.
	pub error_description: Option<String>,
}
impl CallbackParams {
	/// Reads the parameters from a raw query string.
	///
	/// The first occurrence of a key wins and unknown keys are ignored, so repeated parameters
	/// never fail the request before the state cookie is handled.
	pub fn from_query(query: &str) -> Self {
		let mut params = Self::default();

		for (key, value) in form_urlencoded::parse(query.as_bytes()) {
			let slot = match key.as_ref() {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			if slot.is_none() {
				*slot = Some(value.into_owned());
			}
		}

		params
	}
}

/// Redirect issued by [`OAuthExchange::login`].
#[derive(Clone)]
pub struct LoginRedirect {
	/// Provider authorization URL (the `Location` header).
	pub location: Url,
	/// `Set-Cookie` value carrying the state token.
	pub set_cookie: String,
}
impl Debug for LoginRedirect {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRedirect")
			.field("location", &self.location.origin().ascii_serialization())
			.field("set_cookie", &"<redacted>")
			.finish()
	}
}

/// Result of [`OAuthExchange::callback`].
#[derive(Debug)]
pub struct CallbackOutcome {
	/// Expiring `Set-Cookie` value, present whenever the request carried a state cookie.
	pub clear_cookie: Option<String>,
	/// User-info document on success.
	pub result: Result<serde_json::Value>,
}

/// Authorization-code exchange against one identity provider.
#[derive(Clone)]
pub struct OAuthExchange {
	client_id: String,
	redirect_url: Url,
	scopes: Vec<String>,
	cookie: StateCookieConfig,
	clear_cookie: String,
	provider: ProviderDescriptor,
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
}
impl OAuthExchange {
	/// Validates `config` and builds an exchange against Google.
	///
	/// Empty scopes fall back to `openid profile email`; an empty cookie name or path and a
	/// non-positive max-age fall back to their defaults.
	pub fn new(config: &OAuthConfig) -> Result<Self, ConfigError> {
		if !config.enabled {
			return Err(ConfigError::OAuthDisabled);
		}

		let client_id = required("google_oauth.client_id", &config.client_id)?;
		let client_secret = required("google_oauth.client_secret", &config.client_secret)?;
		let redirect_url = Url::parse(required("google_oauth.redirect_url", &config.redirect_url)?)
			.map_err(|source| ConfigError::InvalidUrl { field: "google_oauth.redirect_url", source })?;
		let mut scopes: Vec<String> = config
			.scopes
			.iter()
			.map(|scope| scope.trim())
			.filter(|scope| !scope.is_empty())
			.map(str::to_owned)
			.collect();

		if scopes.is_empty() {
			scopes = DEFAULT_SCOPES.iter().map(|scope| (*scope).to_owned()).collect();
		}

		let cookie = normalize_cookie(&config.state_cookie);
		let clear_cookie = clearing_cookie(&cookie).map_err(|e| {
			ConfigError::invalid("google_oauth.state_cookie", format!("cannot render cookie: {e}"))
		})?;
		let timeout = match config.http_timeout_secs {
			0 => DEFAULT_HTTP_TIMEOUT,
			secs => StdDuration::from_secs(secs),
		};
		let provider = ProviderDescriptor::google()?;
		let oauth_client = build_client(client_id, client_secret, &provider, &redirect_url);

		Ok(Self {
			client_id: client_id.to_owned(),
			redirect_url,
			scopes,
			cookie,
			clear_cookie,
			provider,
			oauth_client,
			http_client: ReqwestHttpClient::new(timeout)?,
		})
	}

	/// Swaps the identity provider.
	pub fn with_provider(mut self, provider: ProviderDescriptor) -> Self {
		self.oauth_client = self
			.oauth_client
			.set_auth_uri(AuthUrl::from_url(provider.endpoints.authorization.clone()))
			.set_token_uri(TokenUrl::from_url(provider.endpoints.token.clone()));
		self.provider = provider;

		self
	}

	/// Swaps the outbound HTTP client.
	pub fn with_http_client(mut self, http_client: ReqwestHttpClient) -> Self {
		self.http_client = http_client;

		self
	}

	/// Provider this exchange talks to.
	pub fn provider(&self) -> &ProviderDescriptor {
		&self.provider
	}

	/// Effective state cookie attributes.
	pub fn state_cookie(&self) -> &StateCookieConfig {
		&self.cookie
	}

	/// Effective scopes.
	pub fn scopes(&self) -> &[String] {
		&self.scopes
	}

	/// Starts a flow: mints a state token and builds the provider redirect.
	pub fn login(&self) -> Result<LoginRedirect> {
		let _guard = OperationSpan::new(OperationKind::OAuthLogin, "login").entered();

		obs::record_outcome(OperationKind::OAuthLogin, Outcome::Attempt);

		let result = self.issue_redirect(&StateToken::generate());

		obs::record_outcome(OperationKind::OAuthLogin, Outcome::of(&result));

		result
	}

	/// Completes a flow from the callback query and the request's state cookie, if any.
	pub async fn callback(&self, params: &CallbackParams, cookie: Option<&str>) -> CallbackOutcome {
		let span = OperationSpan::new(OperationKind::OAuthCallback, "callback");

		obs::record_outcome(OperationKind::OAuthCallback, Outcome::Attempt);

		let clear_cookie = cookie.map(|_| self.clear_cookie.clone());
		let result = span.instrument(self.complete(params, cookie)).await;

		obs::record_outcome(OperationKind::OAuthCallback, Outcome::of(&result));

		CallbackOutcome { clear_cookie, result }
	}

	fn issue_redirect(&self, token: &StateToken) -> Result<LoginRedirect> {
		let set_cookie = SetCookie::new(&self.cookie.name, token.as_str())
			.path(&self.cookie.path)
			.domain(&self.cookie.domain)
			.max_age(self.cookie.max_age)
			.expires(token.issued_at() + Duration::seconds(self.cookie.max_age))
			.http_only(true)
			.secure(self.cookie.secure)
			.same_site(SameSite::Lax)
			.to_header_value()
			.map_err(|e| Error::internal("failed to issue oauth state", e))?;

		tracing::debug!(provider = %self.provider.name, "issuing authorization redirect");

		Ok(LoginRedirect { location: self.authorize_url(token.as_str()), set_cookie })
	}

	fn authorize_url(&self, state: &str) -> Url {
		let mut url = self.provider.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.client_id);
		pairs.append_pair("redirect_uri", self.redirect_url.as_str());
		pairs.append_pair("scope", &self.scopes.join(" "));
		pairs.append_pair("state", state);
		pairs.append_pair("access_type", "offline");

		drop(pairs);

		url
	}

	async fn complete(
		&self,
		params: &CallbackParams,
		cookie: Option<&str>,
	) -> Result<serde_json::Value> {
		if let Some(error) = non_empty(params.error.as_deref()) {
			let description =
				non_empty(params.error_description.as_deref()).unwrap_or("authorization failed");

			tracing::warn!(error, "provider reported an authorization error");

			return Err(Error::BadRequest(format!("google oauth error: {description}")));
		}

		let state = non_empty(params.state.as_deref())
			.ok_or_else(|| Error::Rejected("missing state parameter".into()))?;
		let expected = non_empty(cookie)
			.ok_or_else(|| Error::Rejected("oauth state cookie not found".into()))?;

		if !constant_time_eq(expected.as_bytes(), state.as_bytes()) {
			tracing::warn!("oauth state mismatch");

			return Err(Error::Rejected("invalid oauth state".into()));
		}

		let code = non_empty(params.code.as_deref())
			.ok_or_else(|| Error::BadRequest("missing authorization code".into()))?;
		let access_token = self.exchange_code(code).await?;

		self.fetch_userinfo(&access_token).await
	}

	async fn exchange_code(&self, code: &str) -> Result<String> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|e| {
				let status = meta.take().and_then(|meta| meta.status);

				tracing::warn!(?status, error = %e, "token exchange failed");

				Error::upstream("failed to exchange authorization code", e)
			})?;

		Ok(response.access_token().secret().to_owned())
	}

	async fn fetch_userinfo(&self, access_token: &str) -> Result<serde_json::Value> {
		let response = self
			.http_client
			.get(self.provider.endpoints.userinfo.clone())
			.bearer_auth(access_token)
			.send()
			.await
			.map_err(|e| Error::upstream("failed to retrieve user information", e))?;

		if response.status() != StatusCode::OK {
			tracing::warn!(status = response.status().as_u16(), "user-info request rejected");

			return Err(Error::upstream_msg("unexpected response from google userinfo endpoint"));
		}

		let document = response
			.json::<serde_json::Map<String, serde_json::Value>>()
			.await
			.map_err(|e| Error::upstream("failed to decode user information", e))?;

		Ok(serde_json::Value::Object(document))
	}
}
impl Debug for OAuthExchange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthExchange")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("redirect_url", &self.redirect_url.as_str())
			.field("scopes", &self.scopes)
			.field("cookie", &self.cookie)
			.field("provider", &self.provider.name)
			.finish()
	}
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
	let value = value.trim();

	if value.is_empty() { Err(ConfigError::invalid(field, "must not be empty")) } else { Ok(value) }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.filter(|value| !value.is_empty())
}

fn normalize_cookie(cookie: &StateCookieConfig) -> StateCookieConfig {
	let or_default = |value: &str, default: &str| {
		if value.trim().is_empty() { default.to_owned() } else { value.trim().to_owned() }
	};

	StateCookieConfig {
		name: or_default(&cookie.name, DEFAULT_STATE_COOKIE_NAME),
		domain: cookie.domain.trim().to_owned(),
		path: or_default(&cookie.path, DEFAULT_STATE_COOKIE_PATH),
		max_age: if cookie.max_age > 0 { cookie.max_age } else { DEFAULT_STATE_COOKIE_MAX_AGE },
		secure: cookie.secure,
	}
}

fn clearing_cookie(cookie: &StateCookieConfig) -> Result<String, time::error::Format> {
	SetCookie::new(&cookie.name, "")
		.path(&cookie.path)
		.domain(&cookie.domain)
		.max_age(-1)
		.expires(OffsetDateTime::UNIX_EPOCH)
		.http_only(true)
		.secure(cookie.secure)
		.same_site(SameSite::Lax)
		.to_header_value()
}

fn build_client(
	client_id: &str,
	client_secret: &str,
	provider: &ProviderDescriptor,
	redirect_url: &Url,
) -> ConfiguredBasicClient {
	BasicClient::new(ClientId::new(client_id.to_owned()))
		.set_client_secret(ClientSecret::new(client_secret.to_owned()))
		.set_auth_uri(AuthUrl::from_url(provider.endpoints.authorization.clone()))
		.set_token_uri(TokenUrl::from_url(provider.endpoints.token.clone()))
		.set_redirect_uri(RedirectUrl::from_url(redirect_url.clone()))
}
