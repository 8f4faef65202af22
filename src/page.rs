//! Page documents and slug normalization
//!
//! A [`Page`] is a node in a tree: a slug, an optional parent, a template
//! name selecting which field-set and renderer apply, and an opaque bag of
//! template-specific field values.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Stable unique page identifier, assigned at creation
pub type PageId = Uuid;

/// A page document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
	/// Unique identifier, immutable after creation
	pub id: PageId,

	/// Display title; the slug is derived from it when not set explicitly
	pub title: String,

	/// URL path segment, normalized on every write
	pub slug: String,

	/// Parent page; `None` means root-level
	pub parent: Option<PageId>,

	/// Template name selecting the field-set and renderer
	pub template: String,

	/// Ordering among siblings
	pub sort_order: i32,

	/// Template-specific field values, opaque to the core
	#[serde(default)]
	pub fields: JsonValue,
}

impl Page {
	/// Create a new root-level page with a slug derived from the title
	pub fn new(title: impl Into<String>, template: impl Into<String>) -> Self {
		let title = title.into();
		Self {
			id: Uuid::new_v4(),
			slug: slugify(&title),
			title,
			parent: None,
			template: template.into(),
			sort_order: 0,
			fields: JsonValue::Null,
		}
	}

	/// Set the parent page
	pub fn with_parent(mut self, parent: PageId) -> Self {
		self.parent = Some(parent);
		self
	}

	/// Override the derived slug (normalized on save)
	pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
		self.slug = slug.into();
		self
	}

	/// Set the ordering among siblings
	pub fn with_sort_order(mut self, sort_order: i32) -> Self {
		self.sort_order = sort_order;
		self
	}

	/// Attach template field values
	pub fn with_fields(mut self, fields: JsonValue) -> Self {
		self.fields = fields;
		self
	}

	/// Normalize the slug in place. Ran by stores as part of every write.
	///
	/// The slug is derived from the title at creation; an explicitly empty
	/// slug is kept, which places the page at its parent's path (a root
	/// page with an empty slug serves `/`).
	pub fn normalize(&mut self) {
		self.slug = slugify(&self.slug);
	}

	/// Projection of the fields needed for path resolution
	pub fn summary(&self) -> PageSummary {
		PageSummary {
			id: self.id,
			slug: self.slug.clone(),
			title: self.title.clone(),
			parent: self.parent,
		}
	}
}

/// The `{id, slug, title, parent}` projection used to build the path index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageSummary {
	/// Page id
	pub id: PageId,
	/// Normalized slug
	pub slug: String,
	/// Display title
	pub title: String,
	/// Parent page, `None` for root-level pages
	pub parent: Option<PageId>,
}

/// Normalize a string into a URL-safe slug: lowercase, whitespace and
/// underscores collapsed to single hyphens, everything else non-alphanumeric
/// stripped.
pub fn slugify(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut pending_hyphen = false;

	for c in input.trim().chars() {
		if c.is_alphanumeric() {
			if pending_hyphen && !out.is_empty() {
				out.push('-');
			}
			pending_hyphen = false;
			for lower in c.to_lowercase() {
				out.push(lower);
			}
		} else if c.is_whitespace() || c == '-' || c == '_' || c == '/' {
			pending_hyphen = true;
		}
		// other punctuation is dropped entirely
	}

	out
}

/// Normalize a template name to its registry/view lookup key.
/// Same normalization as [`slugify`]; named separately because template
/// keys and page slugs are distinct namespaces.
pub fn template_key(name: &str) -> String {
	slugify(name)
}
