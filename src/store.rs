//! The tree store seam
//!
//! [`PageStore`] is the narrow query interface the core reads and writes
//! pages through; the host environment supplies the real implementation
//! (document database, ORM, ...). [`InMemoryPageStore`] is a reference
//! implementation used by the tests and small deployments.
//!
//! Writes go through [`PageStore::save`], which must run the write-time
//! validation in [`crate::guard`] before persisting, and abort with no
//! partial mutation on any failure.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{PageError, PageResult};
use crate::guard;
use crate::page::{Page, PageId, PageSummary};
use crate::templates::TemplateRegistry;

/// Narrow query/write interface over the document store holding pages
#[async_trait]
pub trait PageStore: Send + Sync {
	/// Full read of all pages, projected to the fields path resolution needs
	async fn find_all_summaries(&self) -> PageResult<Vec<PageSummary>>;

	/// Load a single page by id
	async fn find_by_id(&self, id: PageId) -> PageResult<Option<Page>>;

	/// Load the direct children of a page (`None` = root-level pages),
	/// ordered by `sort_order` then slug
	async fn find_by_parent(&self, parent: Option<PageId>) -> PageResult<Vec<Page>>;

	/// Validate and persist a page. The write-time guard runs first; either
	/// failure aborts the write with no partial mutation.
	async fn save(&self, page: Page) -> PageResult<Page>;

	/// Delete a page by id
	async fn delete(&self, id: PageId) -> PageResult<()>;
}

/// In-memory page store
#[derive(Clone, Default)]
pub struct InMemoryPageStore {
	pages: Arc<RwLock<HashMap<PageId, Page>>>,
	templates: Option<Arc<TemplateRegistry>>,
}

impl InMemoryPageStore {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Attach a template registry whose per-template validation hooks run
	/// as part of every write, after the structural checks
	pub fn with_templates(mut self, templates: Arc<TemplateRegistry>) -> Self {
		self.templates = Some(templates);
		self
	}

	/// Number of stored pages
	pub async fn len(&self) -> usize {
		self.pages.read().await.len()
	}

	/// Whether the store holds no pages
	pub async fn is_empty(&self) -> bool {
		self.pages.read().await.is_empty()
	}
}

#[async_trait]
impl PageStore for InMemoryPageStore {
	async fn find_all_summaries(&self) -> PageResult<Vec<PageSummary>> {
		let pages = self.pages.read().await;
		Ok(pages.values().map(Page::summary).collect())
	}

	async fn find_by_id(&self, id: PageId) -> PageResult<Option<Page>> {
		let pages = self.pages.read().await;
		Ok(pages.get(&id).cloned())
	}

	async fn find_by_parent(&self, parent: Option<PageId>) -> PageResult<Vec<Page>> {
		let pages = self.pages.read().await;
		let mut children: Vec<Page> = pages
			.values()
			.filter(|page| page.parent == parent)
			.cloned()
			.collect();
		children.sort_by(|a, b| {
			a.sort_order
				.cmp(&b.sort_order)
				.then_with(|| a.slug.cmp(&b.slug))
		});
		Ok(children)
	}

	async fn save(&self, mut page: Page) -> PageResult<Page> {
		page.normalize();

		guard::validate_write(self, &page).await?;
		if let Some(templates) = &self.templates {
			templates.validate(&page)?;
		}

		let mut pages = self.pages.write().await;
		debug!(page = %page.id, slug = %page.slug, "saving page");
		pages.insert(page.id, page.clone());
		Ok(page)
	}

	async fn delete(&self, id: PageId) -> PageResult<()> {
		let mut pages = self.pages.write().await;
		pages
			.remove(&id)
			.map(|_| ())
			.ok_or(PageError::PageNotFound(id))
	}
}

/// A page with its recursively loaded children, ordered by `sort_order`
#[derive(Debug, Clone)]
pub struct PageNode {
	/// The page itself
	pub page: Page,
	/// Direct children, each carrying its own subtree
	pub children: Vec<PageNode>,
}

/// Load the children of a page recursively, each level ordered by
/// `sort_order` then slug.
///
/// The walk tracks visited ids; revisiting one means the parent graph has a
/// cycle that bypassed write validation, which fails with
/// [`PageError::CycleDetected`] instead of recursing forever.
pub async fn load_children(store: &dyn PageStore, id: PageId) -> PageResult<Vec<PageNode>> {
	let mut visited = vec![id];
	load_children_inner(store, id, &mut visited).await
}

// Box-pinned since async recursion; depth is bounded by the visited check.
fn load_children_inner<'a>(
	store: &'a dyn PageStore,
	id: PageId,
	visited: &'a mut Vec<PageId>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = PageResult<Vec<PageNode>>> + Send + 'a>> {
	Box::pin(async move {
		let mut nodes = Vec::new();

		for child in store.find_by_parent(Some(id)).await? {
			if visited.contains(&child.id) {
				return Err(PageError::CycleDetected(child.id));
			}
			visited.push(child.id);

			let child_id = child.id;
			nodes.push(PageNode {
				page: child,
				children: load_children_inner(store, child_id, visited).await?,
			});
		}

		Ok(nodes)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_save_and_find_by_id() {
		let store = InMemoryPageStore::new();
		let page = Page::new("About", "default");

		let saved = store.save(page.clone()).await.unwrap();
		assert_eq!(saved.slug, "about");

		let found = store.find_by_id(page.id).await.unwrap();
		assert_eq!(found.unwrap().id, page.id);
	}

	#[tokio::test]
	async fn test_save_normalizes_slug() {
		let store = InMemoryPageStore::new();
		let page = Page::new("About", "default").with_slug("Our TEAM");

		let saved = store.save(page).await.unwrap();

		assert_eq!(saved.slug, "our-team");
	}

	#[tokio::test]
	async fn test_find_by_parent_orders_by_sort_order() {
		let store = InMemoryPageStore::new();
		let parent = store.save(Page::new("Parent", "default")).await.unwrap();

		store
			.save(
				Page::new("Second", "default")
					.with_parent(parent.id)
					.with_sort_order(2),
			)
			.await
			.unwrap();
		store
			.save(
				Page::new("First", "default")
					.with_parent(parent.id)
					.with_sort_order(1),
			)
			.await
			.unwrap();

		let children = store.find_by_parent(Some(parent.id)).await.unwrap();
		let slugs: Vec<&str> = children.iter().map(|c| c.slug.as_str()).collect();
		assert_eq!(slugs, vec!["first", "second"]);
	}

	#[tokio::test]
	async fn test_delete_missing_page_errors() {
		let store = InMemoryPageStore::new();
		let result = store.delete(PageId::new_v4()).await;
		assert!(matches!(result, Err(PageError::PageNotFound(_))));
	}

	#[tokio::test]
	async fn test_load_children_recursive() {
		let store = InMemoryPageStore::new();
		let root = store.save(Page::new("Root", "default")).await.unwrap();
		let child = store
			.save(Page::new("Child", "default").with_parent(root.id))
			.await
			.unwrap();
		store
			.save(Page::new("Grandchild", "default").with_parent(child.id))
			.await
			.unwrap();

		let tree = load_children(&store, root.id).await.unwrap();

		assert_eq!(tree.len(), 1);
		assert_eq!(tree[0].page.id, child.id);
		assert_eq!(tree[0].children.len(), 1);
		assert_eq!(tree[0].children[0].page.slug, "grandchild");
	}

	#[tokio::test]
	async fn test_save_rejects_duplicate_sibling_slug() {
		let store = InMemoryPageStore::new();
		store.save(Page::new("About", "default")).await.unwrap();

		let result = store.save(Page::new("About", "default")).await;

		assert!(matches!(result, Err(PageError::DuplicateSlug { .. })));
		assert_eq!(store.len().await, 1);
	}
}
