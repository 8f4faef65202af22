//! Path resolution and the path index
//!
//! The [`PathIndex`] is the derived, in-memory mapping between page ids and
//! full URL paths. It is rebuilt wholesale from a full read of all pages and
//! swapped in as an immutable snapshot by its owner ([`crate::pipeline`]);
//! it is never mutated incrementally.
//!
//! A full path is the ordered concatenation of slugs from root to the page,
//! wrapped in separators: parts `["about", "team"]` become `/about/team/`.
//! A root page with an empty slug yields `/`.

use std::collections::HashMap;

use tracing::{error, warn};

use crate::error::{PageError, PageResult};
use crate::page::{PageId, PageSummary};

/// The resolved path of a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath {
	/// Ordered slugs from root to the page
	pub parts: Vec<String>,
	/// Canonical full path, `/a/b/` form
	pub full: String,
}

/// Mapping of every page id to its full path and back
///
/// Pure function of the full page list; rebuilding twice from the same
/// pages yields identical contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathIndex {
	by_page: HashMap<PageId, PagePath>,
	by_path: HashMap<String, PageId>,
}

impl PathIndex {
	/// Build the index from a full, current read of all pages.
	///
	/// Each page's path is resolved by walking its parent chain through an
	/// id-indexed map. A dangling parent reference demotes the page to a
	/// root (silent degradation, logged at warn level). Walks are bounded
	/// by the total page count: exceeding the bound means a parent cycle
	/// survived past write validation and fails with
	/// [`PageError::CycleDetected`] rather than hanging.
	pub fn build(pages: &[PageSummary]) -> PageResult<Self> {
		let by_id: HashMap<PageId, &PageSummary> =
			pages.iter().map(|page| (page.id, page)).collect();

		let mut by_page = HashMap::with_capacity(pages.len());
		let mut by_path = HashMap::with_capacity(pages.len());

		for page in pages {
			let mut parts = vec![page.slug.clone()];
			let mut current = page;
			let mut steps = 0usize;

			while let Some(parent_id) = current.parent {
				let Some(parent) = by_id.get(&parent_id).copied() else {
					warn!(
						page = %current.id,
						parent = %parent_id,
						"dangling parent reference, treating page as root"
					);
					break;
				};

				steps += 1;
				if steps > pages.len() {
					error!(page = %page.id, "unbounded parent chain in page tree");
					return Err(PageError::CycleDetected(page.id));
				}

				parts.push(parent.slug.clone());
				current = parent;
			}

			parts.reverse();
			let full = join_full_path(&parts);
			by_page.insert(page.id, PagePath {
				parts,
				full: full.clone(),
			});
			by_path.insert(full, page.id);
		}

		Ok(Self { by_page, by_path })
	}

	/// Look up a page id by its canonical full path
	pub fn lookup(&self, full_path: &str) -> Option<PageId> {
		self.by_path.get(full_path).copied()
	}

	/// The resolved path of a page, if the page is in the index
	pub fn path_of(&self, id: PageId) -> Option<&PagePath> {
		self.by_page.get(&id)
	}

	/// Number of indexed pages
	pub fn len(&self) -> usize {
		self.by_page.len()
	}

	/// Whether the index holds no pages
	pub fn is_empty(&self) -> bool {
		self.by_page.is_empty()
	}
}

/// Join path parts into the canonical `/a/b/` form.
///
/// Empty parts are skipped, so a root page with an empty slug maps to `/`
/// and its children to `/child/`.
pub fn join_full_path(parts: &[String]) -> String {
	let joined = parts
		.iter()
		.filter(|part| !part.is_empty())
		.cloned()
		.collect::<Vec<_>>()
		.join("/");

	if joined.is_empty() {
		"/".to_string()
	} else {
		format!("/{joined}/")
	}
}

/// Normalize an arbitrary request path to canonical `/a/b/` form: query and
/// fragment stripped, empty segments dropped, trailing separator re-applied.
pub fn normalize_request_path(path: &str) -> String {
	let path = path
		.split(['?', '#'])
		.next()
		.unwrap_or_default();

	let parts: Vec<String> = path
		.split('/')
		.filter(|segment| !segment.is_empty())
		.map(str::to_string)
		.collect();

	join_full_path(&parts)
}
