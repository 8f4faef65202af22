//! The per-request pipeline
//!
//! [`PagePipeline`] is what the host mounts: it owns the current
//! [`PathIndex`] snapshot, the page object cache, the store handle and the
//! view registry. `refresh_paths` rebuilds the index from a full store read
//! and swaps it in wholesale; concurrent readers see either the old or the
//! new snapshot, never a mix. `resolve` runs the request flow
//! (match -> load -> render) and declines with `Ok(None)` on any resolution
//! miss so the host chain can fall through to its next handler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use tracing::debug;

use crate::cache::{DEFAULT_PAGE_TTL, PageCache};
use crate::error::PageResult;
use crate::matcher::{self, PathMatch};
use crate::page::Page;
use crate::paths::PathIndex;
use crate::store::PageStore;
use crate::views::ViewRegistry;

/// Pipeline configuration, deserializable from host settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PagetreeConfig {
	/// Freshness window for cached page objects
	pub page_cache_ttl: Duration,

	/// Maximum age of the path index before `ensure_fresh` rebuilds it
	pub path_index_ttl: Duration,

	/// Directory of fallback template resources, if any
	pub template_dir: Option<PathBuf>,
}

impl Default for PagetreeConfig {
	fn default() -> Self {
		Self {
			page_cache_ttl: DEFAULT_PAGE_TTL,
			path_index_ttl: Duration::from_secs(30),
			template_dir: None,
		}
	}
}

/// A successfully resolved request
#[derive(Debug)]
pub struct ResolvedPage {
	/// The matched page document
	pub page: Page,
	/// How the request path matched (exact or prefix fallback)
	pub path_match: PathMatch,
	/// Rendered body from the dispatched view
	pub body: String,
}

/// Process-wide page resolution state and request entry point
pub struct PagePipeline {
	store: Arc<dyn PageStore>,
	views: ViewRegistry,
	cache: PageCache,
	index: RwLock<Arc<PathIndex>>,
	index_built_at: Mutex<Option<Instant>>,
	config: PagetreeConfig,
}

impl PagePipeline {
	/// Create a pipeline over a store and view registry.
	///
	/// The path index starts empty; call [`Self::refresh_paths`] (or let
	/// [`Self::ensure_fresh`] do it) before resolving requests. When the
	/// config names a template directory, it becomes the view registry's
	/// fallback.
	pub fn new(store: Arc<dyn PageStore>, views: ViewRegistry, config: PagetreeConfig) -> Self {
		let views = match &config.template_dir {
			Some(dir) => views.with_fallback_dir(dir),
			None => views,
		};

		Self {
			cache: PageCache::new(store.clone(), config.page_cache_ttl),
			store,
			views,
			index: RwLock::new(Arc::new(PathIndex::default())),
			index_built_at: Mutex::new(None),
			config,
		}
	}

	/// Rebuild the path index from a full store read and swap it in.
	///
	/// The swap is a single assignment of a new immutable snapshot;
	/// in-flight readers keep the snapshot they already cloned.
	pub async fn refresh_paths(&self) -> PageResult<()> {
		let summaries = self.store.find_all_summaries().await?;
		let index = Arc::new(PathIndex::build(&summaries)?);

		debug!(pages = index.len(), "path index rebuilt");
		*self.index.write() = index;
		*self.index_built_at.lock() = Some(Instant::now());
		Ok(())
	}

	/// Rebuild the path index only when it is missing or older than the
	/// configured freshness window. Intended as the per-request trigger.
	pub async fn ensure_fresh(&self) -> PageResult<()> {
		let stale = match *self.index_built_at.lock() {
			Some(built_at) => built_at.elapsed() > self.config.path_index_ttl,
			None => true,
		};

		if stale {
			self.refresh_paths().await?;
		}
		Ok(())
	}

	/// The current index snapshot
	pub fn current_index(&self) -> Arc<PathIndex> {
		self.index.read().clone()
	}

	/// Resolve a request path to a rendered page.
	///
	/// Returns `Ok(None)` when this pipeline declines the request: no page
	/// matches the path, the matched id has no live record, or no view
	/// exists for the page's template. Store and I/O failures propagate as
	/// hard errors.
	pub async fn resolve(&self, request_path: &str) -> PageResult<Option<ResolvedPage>> {
		let index = self.current_index();

		let path_match = match matcher::resolve(&index, request_path) {
			Ok(path_match) => path_match,
			Err(e) if e.is_resolution_miss() => {
				debug!(path = request_path, "no page for path, declining");
				return Ok(None);
			}
			Err(e) => return Err(e),
		};

		let page = match self.cache.get(path_match.page_id).await {
			Ok(page) => page,
			Err(e) if e.is_resolution_miss() => {
				debug!(page = %path_match.page_id, "matched id has no live record, declining");
				return Ok(None);
			}
			Err(e) => return Err(e),
		};

		let body = match self.views.dispatch(&page, request_path).await {
			Ok(body) => body,
			Err(e) if e.is_resolution_miss() => {
				debug!(template = %page.template, "no view for template, declining");
				return Ok(None);
			}
			Err(e) => return Err(e),
		};

		Ok(Some(ResolvedPage {
			page,
			path_match,
			body,
		}))
	}

	/// The page object cache, for hosts that want to invalidate on write
	pub fn page_cache(&self) -> &PageCache {
		&self.cache
	}
}
