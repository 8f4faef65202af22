//! Property-based tests for path resolution and matching

use std::collections::HashSet;

use pagetree::matcher;
use pagetree::page::{Page, PageId, PageSummary, slugify};
use pagetree::paths::{PathIndex, normalize_request_path};
use proptest::prelude::*;

/// Build an acyclic forest: each page picks its parent among the pages
/// created before it (or none), and sibling slugs are disambiguated with
/// the page's position so the uniqueness invariant holds by construction.
fn forest(specs: Vec<(String, usize)>) -> Vec<PageSummary> {
	let mut pages: Vec<PageSummary> = Vec::with_capacity(specs.len());

	for (i, (base, parent_pick)) in specs.into_iter().enumerate() {
		let parent = if i == 0 {
			None
		} else {
			match parent_pick % (i + 1) {
				0 => None,
				pick => Some(pages[pick - 1].id),
			}
		};

		pages.push(PageSummary {
			id: PageId::new_v4(),
			slug: format!("{base}-{i}"),
			title: base,
			parent,
		});
	}

	pages
}

proptest! {
	#[test]
	fn prop_every_page_gets_exactly_one_path(
		specs in proptest::collection::vec(("[a-z]{1,8}", 0..50usize), 1..30)
	) {
		// Arrange
		let pages = forest(specs);

		// Act
		let index = PathIndex::build(&pages).unwrap();

		// Assert
		prop_assert_eq!(index.len(), pages.len());
		for page in &pages {
			prop_assert!(index.path_of(page.id).is_some());
		}
	}

	#[test]
	fn prop_full_paths_are_unique(
		specs in proptest::collection::vec(("[a-z]{1,8}", 0..50usize), 1..30)
	) {
		// Arrange
		let pages = forest(specs);
		let index = PathIndex::build(&pages).unwrap();

		// Act
		let paths: HashSet<&str> = pages
			.iter()
			.map(|page| index.path_of(page.id).unwrap().full.as_str())
			.collect();

		// Assert - slug uniqueness among siblings implies path uniqueness
		prop_assert_eq!(paths.len(), pages.len());
	}

	#[test]
	fn prop_matcher_is_exact_on_every_full_path(
		specs in proptest::collection::vec(("[a-z]{1,8}", 0..50usize), 1..30)
	) {
		// Arrange
		let pages = forest(specs);
		let index = PathIndex::build(&pages).unwrap();

		// Act & Assert
		for page in &pages {
			let full = &index.path_of(page.id).unwrap().full;
			let matched = matcher::resolve(&index, full).unwrap();
			prop_assert_eq!(matched.page_id, page.id);
			prop_assert!(matched.exact);
		}
	}

	#[test]
	fn prop_rebuild_is_idempotent(
		specs in proptest::collection::vec(("[a-z]{1,8}", 0..50usize), 1..30)
	) {
		// Arrange
		let pages = forest(specs);

		// Act
		let first = PathIndex::build(&pages).unwrap();
		let second = PathIndex::build(&pages).unwrap();

		// Assert
		prop_assert_eq!(first, second);
	}

	#[test]
	fn prop_paths_are_wrapped_in_separators(
		specs in proptest::collection::vec(("[a-z]{1,8}", 0..50usize), 1..30)
	) {
		// Arrange
		let pages = forest(specs);
		let index = PathIndex::build(&pages).unwrap();

		// Act & Assert
		for page in &pages {
			let full = &index.path_of(page.id).unwrap().full;
			prop_assert!(full.starts_with('/'));
			prop_assert!(full.ends_with('/'));
		}
	}

	#[test]
	fn fuzz_slugify_never_panics(input in ".*") {
		// Arrange, Act, Assert - arbitrary titles never cause panics
		let slug = slugify(&input);
		prop_assert!(!slug.contains(char::is_whitespace));
		prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
		prop_assert!(!slug.contains("--"));
	}

	#[test]
	fn fuzz_normalize_request_path_is_canonical(input in ".*") {
		// Act
		let normalized = normalize_request_path(&input);

		// Assert - normalizing twice is a fixed point
		prop_assert!(normalized.starts_with('/'));
		prop_assert_eq!(normalize_request_path(&normalized), normalized.clone());
	}

	#[test]
	fn fuzz_matcher_never_panics_on_arbitrary_paths(
		specs in proptest::collection::vec(("[a-z]{1,8}", 0..50usize), 1..10),
		request in ".*",
	) {
		// Arrange
		let pages = forest(specs);
		let index = PathIndex::build(&pages).unwrap();

		// Act & Assert - resolution either matches or reports not found
		let _ = matcher::resolve(&index, &request);
	}

	#[test]
	fn fuzz_dangling_parents_always_build(
		specs in proptest::collection::vec("[a-z]{1,8}", 1..20)
	) {
		// Arrange - every page points at a parent that does not exist
		let pages: Vec<PageSummary> = specs
			.into_iter()
			.enumerate()
			.map(|(i, base)| PageSummary {
				id: PageId::new_v4(),
				slug: format!("{base}-{i}"),
				title: base,
				parent: Some(PageId::new_v4()),
			})
			.collect();

		// Act
		let index = PathIndex::build(&pages).unwrap();

		// Assert - dangling parents degrade to roots, never error
		prop_assert_eq!(index.len(), pages.len());
	}
}

#[test]
fn test_page_summary_roundtrip_through_page() {
	// Slug derivation on Page keeps PageSummary projections consistent
	let page = Page::new("Some Title", "default");
	let summary = page.summary();
	assert_eq!(summary.slug, slugify("Some Title"));
	assert_eq!(summary.parent, None);
}
