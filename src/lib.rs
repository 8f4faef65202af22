//! # pagetree
//!
//! A hierarchical "Page" content type for content-driven sites: a tree of
//! pages, each bound to a template, resolved to URL paths, cached, and
//! dispatched to a view renderer.
//!
//! The crate is a library invoked per-request by a host framework's
//! middleware chain. It owns none of the surrounding machinery (admin UI,
//! schema system, authentication, database driver, HTTP server); those are
//! collaborators reached through the traits in [`store`], [`cache`] and
//! [`views`].
//!
//! ## Architecture
//!
//! ```text
//! pagetree
//! ├── page      - Page document, ids, slug normalization
//! ├── store     - PageStore trait + in-memory reference store
//! ├── paths     - PathIndex: page id <-> full URL path
//! ├── matcher   - longest-prefix request path matching
//! ├── cache     - CacheBackend trait + TTL page object cache
//! ├── guard     - write-time cycle / duplicate-slug validation
//! ├── templates - template registry, typed field construction
//! ├── views     - view registry + convention-based fallback
//! └── pipeline  - per-request resolve: match -> load -> render
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagetree::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryPageStore::new());
//! let mut views = ViewRegistry::new();
//! views.register("Default", my_default_view);
//!
//! let pipeline = PagePipeline::new(store, views, PagetreeConfig::default());
//! pipeline.refresh_paths().await?;
//!
//! if let Some(resolved) = pipeline.resolve("/about/team/").await? {
//!     // hand resolved.body to the host response
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod guard;
pub mod matcher;
pub mod page;
pub mod paths;
pub mod pipeline;
pub mod store;
pub mod templates;
pub mod views;

// Prelude for convenient imports
pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::cache::{CacheBackend, InMemoryCache, PageCache};
	pub use crate::error::{PageError, PageResult};
	pub use crate::matcher::PathMatch;
	pub use crate::page::{Page, PageId, PageSummary};
	pub use crate::paths::{PagePath, PathIndex};
	pub use crate::pipeline::{PagePipeline, PagetreeConfig, ResolvedPage};
	pub use crate::store::{InMemoryPageStore, PageNode, PageStore};
	pub use crate::templates::{TemplateDefinition, TemplateRegistry};
	pub use crate::views::{PageView, ViewRegistry};
}

/// Page tree error types
pub mod error {
	use thiserror::Error;

	use crate::page::PageId;

	/// Errors raised by page resolution, caching and validation
	#[derive(Error, Debug)]
	pub enum PageError {
		/// No page id matches the request path, even after prefix backoff
		#[error("No page id found for path: {0}")]
		PageIdNotFound(String),

		/// A resolved id does not correspond to a live record
		#[error("Page not found: {0}")]
		PageNotFound(PageId),

		/// No renderer registered for the template and no fallback resource
		#[error("No view found for template: {0}")]
		ViewNotFound(String),

		/// Write rejected: the parent chain would contain the page itself
		#[error("Circular parent path detected for page: {0}")]
		CircularParent(PageId),

		/// Write rejected: a sibling already uses this slug
		#[error("Slug must be unique among siblings: {slug}")]
		DuplicateSlug {
			/// Parent under which the collision occurred (`None` = root)
			parent: Option<PageId>,
			/// The colliding slug
			slug: String,
		},

		/// Path resolution hit an unbounded parent chain. The write-time
		/// guard was bypassed; this is a data-integrity violation.
		#[error("Cycle detected in parent chain of page: {0}")]
		CycleDetected(PageId),

		/// Template name not present in the registry
		#[error("Template not registered: {0}")]
		UnknownTemplate(String),

		/// Underlying store failure, propagated unchanged
		#[error("Store error: {0}")]
		Store(String),

		/// Serialization failure in a cache backend
		#[error("Serialization error: {0}")]
		Serialization(String),

		/// I/O failure outside the store (e.g. fallback view lookup)
		#[error("I/O error: {0}")]
		Io(#[from] std::io::Error),
	}

	impl PageError {
		/// Whether this error means "not handled here" during request
		/// resolution. Misses cause the pipeline to decline the request
		/// rather than fail it; everything else is a hard error.
		pub fn is_resolution_miss(&self) -> bool {
			matches!(
				self,
				Self::PageIdNotFound(_) | Self::PageNotFound(_) | Self::ViewNotFound(_)
			)
		}
	}

	/// Result type for page tree operations
	pub type PageResult<T> = Result<T, PageError>;
}
