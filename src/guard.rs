//! Write-time validation
//!
//! Runs as a single step before any page write persists. Three checks:
//! self-parent, ancestor cycle, and sibling slug uniqueness. Either failure
//! aborts the write; the store must not have mutated anything yet.
//!
//! The ancestor walk is iterative and capped at the total page count. Given
//! the self/ancestor checks the cap should never trip, but the contract is
//! to fail safe rather than loop when it does.

use tracing::debug;

use crate::error::{PageError, PageResult};
use crate::page::Page;
use crate::store::PageStore;

/// Validate a page write against the current store contents.
///
/// Rejects with [`PageError::CircularParent`] when the proposed parent is
/// the page itself or one of its descendants, and with
/// [`PageError::DuplicateSlug`] when another page already holds the same
/// `(parent, slug)` pair.
pub async fn validate_write(store: &dyn PageStore, page: &Page) -> PageResult<()> {
	if page.parent == Some(page.id) {
		return Err(PageError::CircularParent(page.id));
	}

	check_ancestor_cycle(store, page).await?;
	check_sibling_slug(store, page).await?;

	debug!(page = %page.id, "write validation passed");
	Ok(())
}

/// Walk up from the proposed parent through successive parent links. Finding
/// the page's own id is a cycle; reaching a root (or a dangling reference)
/// is fine. The walk is capped at the total page count.
async fn check_ancestor_cycle(store: &dyn PageStore, page: &Page) -> PageResult<()> {
	let Some(mut current) = page.parent else {
		return Ok(());
	};

	let bound = store.find_all_summaries().await?.len();
	let mut steps = 0usize;

	loop {
		if current == page.id {
			return Err(PageError::CircularParent(page.id));
		}

		if steps > bound {
			return Err(PageError::CycleDetected(page.id));
		}
		steps += 1;

		match store.find_by_id(current).await? {
			Some(ancestor) => match ancestor.parent {
				Some(parent_id) => current = parent_id,
				None => return Ok(()),
			},
			// Dangling reference terminates the chain like a root
			None => return Ok(()),
		}
	}
}

/// Only one slug per set of sibling pages
async fn check_sibling_slug(store: &dyn PageStore, page: &Page) -> PageResult<()> {
	let siblings = store.find_by_parent(page.parent).await?;

	let collision = siblings
		.iter()
		.any(|sibling| sibling.id != page.id && sibling.slug == page.slug);

	if collision {
		return Err(PageError::DuplicateSlug {
			parent: page.parent,
			slug: page.slug.clone(),
		});
	}

	Ok(())
}
