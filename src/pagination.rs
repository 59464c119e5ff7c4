//! Page bounding and continuation hints shared by every list endpoint.

// self
use crate::{_prelude::*, pet::PetId};

/// Largest page a caller may request; larger limits clamp silently.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Validated page size. `0` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageLimit(u32);
impl PageLimit {
	/// Builds a limit from the caller-supplied value.
	///
	/// `None` and `0` are unbounded, values above [`MAX_PAGE_LIMIT`] clamp, and negative values
	/// are rejected.
	pub fn from_request(raw: Option<i64>) -> Result<Self, PageLimitError> {
		match raw {
			None => Ok(Self(0)),
			Some(value) if value < 0 => Err(PageLimitError::Negative),
			Some(value) => Ok(Self(value.min(i64::from(MAX_PAGE_LIMIT)) as u32)),
		}
	}

	/// Effective page size; `0` when unbounded.
	pub fn get(self) -> u32 {
		self.0
	}

	/// Returns `true` when the page is uncapped.
	pub fn is_unbounded(self) -> bool {
		self.0 == 0
	}

	/// Number of records to request from the store: one extra record reveals whether another
	/// page follows.
	pub fn fetch_limit(self) -> u32 {
		if self.is_unbounded() { 0 } else { self.0 + 1 }
	}
}

/// Rejected page limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum PageLimitError {
	/// The caller asked for a negative page size.
	#[error("limit must be non-negative")]
	Negative,
}

/// Position at which the next page begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContinuationHint {
	/// Page size of the current request.
	pub limit: u32,
	/// Id of the first record excluded from the current page.
	pub after: PetId,
}
impl Display for ContinuationHint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "limit={}&after={}", self.limit, self.after)
	}
}

/// One page of results plus the hint for the next one, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
	/// Records on this page, in ascending id order.
	pub items: Vec<T>,
	/// Present only when the result was truncated.
	pub next: Option<ContinuationHint>,
}

/// Splits `records` (fetched with [`PageLimit::fetch_limit`]) into a page and its hint.
///
/// `key` extracts the id used for the hint from the first excluded record.
pub fn paginate<T>(limit: PageLimit, mut records: Vec<T>, key: impl Fn(&T) -> PetId) -> Page<T> {
	if limit.is_unbounded() || records.len() <= limit.get() as usize {
		return Page { items: records, next: None };
	}

	let excess = records.split_off(limit.get() as usize);
	let next = excess.first().map(|first| ContinuationHint { limit: limit.get(), after: key(first) });

	Page { items: records, next }
}
