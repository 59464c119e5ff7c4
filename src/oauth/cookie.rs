//! Minimal `Set-Cookie` rendering and `Cookie` header lookup.

// crates.io
use axum::http::{HeaderMap, header::COOKIE};
use time::{UtcOffset, format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::_prelude::*;

const HTTP_DATE: &[BorrowedFormatItem<'static>] = format_description!(
	"[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// `SameSite` cookie attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSite {
	/// Sent on top-level navigations only.
	Lax,
	/// Never sent cross-site.
	Strict,
	/// Always sent; requires `Secure`.
	None,
}
impl SameSite {
	/// Attribute value.
	pub const fn as_str(self) -> &'static str {
		match self {
			SameSite::Lax => "Lax",
			SameSite::Strict => "Strict",
			SameSite::None => "None",
		}
	}
}

/// `Set-Cookie` header builder.
#[derive(Clone, Debug)]
pub struct SetCookie {
	name: String,
	value: String,
	domain: Option<String>,
	path: Option<String>,
	max_age: Option<i64>,
	expires: Option<OffsetDateTime>,
	secure: bool,
	http_only: bool,
	same_site: Option<SameSite>,
}
impl SetCookie {
	/// Starts a cookie with no attributes.
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
			domain: None,
			path: None,
			max_age: None,
			expires: None,
			secure: false,
			http_only: false,
			same_site: None,
		}
	}

	/// Sets `Domain`; empty values are ignored.
	pub fn domain(mut self, domain: impl Into<String>) -> Self {
		let domain = domain.into();

		self.domain = (!domain.is_empty()).then_some(domain);

		self
	}

	/// Sets `Path`; empty values are ignored.
	pub fn path(mut self, path: impl Into<String>) -> Self {
		let path = path.into();

		self.path = (!path.is_empty()).then_some(path);

		self
	}

	/// Sets `Max-Age` in seconds. Non-positive values expire the cookie immediately.
	pub fn max_age(mut self, seconds: i64) -> Self {
		self.max_age = Some(seconds);

		self
	}

	/// Sets `Expires`.
	pub fn expires(mut self, at: OffsetDateTime) -> Self {
		self.expires = Some(at);

		self
	}

	/// Toggles `Secure`.
	pub fn secure(mut self, secure: bool) -> Self {
		self.secure = secure;

		self
	}

	/// Toggles `HttpOnly`.
	pub fn http_only(mut self, http_only: bool) -> Self {
		self.http_only = http_only;

		self
	}

	/// Sets `SameSite`.
	pub fn same_site(mut self, same_site: SameSite) -> Self {
		self.same_site = Some(same_site);

		self
	}

	/// Renders the header value.
	pub fn to_header_value(&self) -> Result<String, time::error::Format> {
		let mut parts = vec![format!("{}={}", self.name, self.value)];

		if let Some(path) = &self.path {
			parts.push(format!("Path={path}"));
		}
		if let Some(domain) = &self.domain {
			parts.push(format!("Domain={domain}"));
		}
		if let Some(expires) = self.expires {
			let expires = expires.to_offset(UtcOffset::UTC).format(HTTP_DATE)?;

			parts.push(format!("Expires={expires}"));
		}
		if let Some(max_age) = self.max_age {
			parts.push(format!("Max-Age={}", max_age.max(0)));
		}
		if self.http_only {
			parts.push("HttpOnly".into());
		}
		if self.secure {
			parts.push("Secure".into());
		}
		if let Some(same_site) = self.same_site {
			parts.push(format!("SameSite={}", same_site.as_str()));
		}

		Ok(parts.join("; "))
	}
}

/// Returns the first cookie called `name` across every `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(key, _)| key.trim() == name)
		.map(|(_, value)| value.trim().trim_matches('"').to_owned())
}
