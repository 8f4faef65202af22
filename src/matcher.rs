//! Longest-prefix request path matching
//!
//! Finds the most specific page whose full path is a prefix of the request
//! path, backing off one segment at a time toward the root. Slug uniqueness
//! among siblings guarantees at most one page per full path, so the first
//! hit walking from most- to least-specific is authoritative.

use crate::error::{PageError, PageResult};
use crate::page::PageId;
use crate::paths::{PathIndex, normalize_request_path};

/// Outcome of matching a request path against the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathMatch {
	/// The matched page
	pub page_id: PageId,
	/// Whether the match was exact, or a prefix fallback
	pub exact: bool,
}

/// Resolve a request path to a page id.
///
/// The path is normalized to the canonical `/a/b/` form first. An exact hit
/// returns `exact: true`; otherwise the last segment is stripped and the
/// lookup retried (`/a/b/` -> `/a/` -> `/`) until a page is found. If
/// nothing matches, including no root page, this is
/// [`PageError::PageIdNotFound`].
pub fn resolve(index: &PathIndex, request_path: &str) -> PageResult<PathMatch> {
	let mut path = normalize_request_path(request_path);

	if let Some(page_id) = index.lookup(&path) {
		return Ok(PathMatch {
			page_id,
			exact: true,
		});
	}

	while path != "/" {
		path = parent_path(&path);

		if let Some(page_id) = index.lookup(&path) {
			return Ok(PathMatch {
				page_id,
				exact: false,
			});
		}
	}

	Err(PageError::PageIdNotFound(request_path.to_string()))
}

/// Strip the last segment of a canonical path: `/a/b/` -> `/a/`, `/a/` -> `/`
fn parent_path(path: &str) -> String {
	let trimmed = path.trim_end_matches('/');
	match trimmed.rfind('/') {
		Some(idx) => trimmed[..=idx].to_string(),
		None => "/".to_string(),
	}
}
