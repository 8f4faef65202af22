//! View dispatch
//!
//! A resolved page's template name, normalized to the same key form as the
//! template registry, selects a renderer from an externally supplied
//! [`ViewRegistry`]. Without an exact match the registry can fall back to a
//! directory locator that resolves a template resource by naming convention
//! and renders it directly; a missing resource is [`PageError::ViewNotFound`]
//! while any other I/O failure propagates as-is.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{PageError, PageResult};
use crate::page::{Page, template_key};

/// An opaque renderer for one template
#[async_trait]
pub trait PageView: Send + Sync {
	/// Render the resolved page for the given request path
	async fn render(&self, page: &Page, request_path: &str) -> PageResult<String>;
}

/// Blanket implementation so plain async-compatible closures are not needed
/// for the common "static function" case.
#[async_trait]
impl<F> PageView for F
where
	F: Fn(&Page) -> PageResult<String> + Send + Sync,
{
	async fn render(&self, page: &Page, _request_path: &str) -> PageResult<String> {
		self(page)
	}
}

/// Registry of renderers keyed by normalized template name
#[derive(Default)]
pub struct ViewRegistry {
	views: HashMap<String, Arc<dyn PageView>>,
	fallback: Option<TemplateDirLocator>,
}

impl ViewRegistry {
	/// Create an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a renderer for a template name
	pub fn register(&mut self, template: &str, view: impl PageView + 'static) {
		self.views.insert(template_key(template), Arc::new(view));
	}

	/// Use a directory of template resources as the fallback for templates
	/// without a registered renderer
	pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.fallback = Some(TemplateDirLocator::new(dir));
		self
	}

	/// Find a renderer for an (unnormalized) template name
	pub fn resolve(&self, template: &str) -> Option<Arc<dyn PageView>> {
		self.views.get(&template_key(template)).cloned()
	}

	/// Render a page: registered renderer first, fallback locator second.
	///
	/// No renderer and no fallback resource is [`PageError::ViewNotFound`].
	pub async fn dispatch(&self, page: &Page, request_path: &str) -> PageResult<String> {
		if let Some(view) = self.resolve(&page.template) {
			debug!(template = %page.template, "dispatching to registered view");
			return view.render(page, request_path).await;
		}

		match &self.fallback {
			Some(locator) => locator.render(page).await,
			None => Err(PageError::ViewNotFound(template_key(&page.template))),
		}
	}
}

/// Locates template resources by naming convention (`<dir>/<key>.html`) and
/// renders them directly
pub struct TemplateDirLocator {
	dir: PathBuf,
	extension: String,
}

impl TemplateDirLocator {
	/// Create a locator over a template directory, looking for `.html` files
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			extension: "html".to_string(),
		}
	}

	/// Override the resource extension
	pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
		self.extension = extension.into();
		self
	}

	/// Read the template resource for a page's template.
	///
	/// Missing resource maps to [`PageError::ViewNotFound`]; any other I/O
	/// error propagates unchanged.
	pub async fn render(&self, page: &Page) -> PageResult<String> {
		let key = template_key(&page.template);
		let path = self.dir.join(format!("{key}.{}", self.extension));

		match tokio::fs::read_to_string(&path).await {
			Ok(body) => Ok(body),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				Err(PageError::ViewNotFound(key))
			}
			Err(e) => Err(PageError::Io(e)),
		}
	}
}
