//! Caching
//!
//! [`CacheBackend`] is the generic get/set-with-TTL seam; [`InMemoryCache`]
//! is the default backend. [`PageCache`] sits on top of a backend and keeps
//! fully loaded page documents for a fixed freshness window (30 seconds by
//! default) so request handling avoids a store round-trip per hit.
//!
//! The page cache is a pure performance layer: writes do not evict it, and
//! staleness within the window is an accepted tradeoff. Missing pages are
//! never cached as negative results; repeated misses repeat the lookup.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{PageError, PageResult};
use crate::page::{Page, PageId};
use crate::store::PageStore;

/// Generic cache backend: serialized values with optional expiry
#[async_trait]
pub trait CacheBackend: Send + Sync {
	/// Get a value by key; `None` on miss or expired entry
	async fn get<T>(&self, key: &str) -> PageResult<Option<T>>
	where
		T: for<'de> Deserialize<'de> + Send;

	/// Store a value under a key, expiring after `ttl` if given
	async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> PageResult<()>
	where
		T: Serialize + Send + Sync;

	/// Remove a key
	async fn delete(&self, key: &str) -> PageResult<()>;

	/// Whether a live (non-expired) entry exists for the key
	async fn has_key(&self, key: &str) -> PageResult<bool>;

	/// Drop all entries
	async fn clear(&self) -> PageResult<()>;
}

/// Cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
	value: Vec<u8>,
	expires_at: Option<SystemTime>,
}

impl CacheEntry {
	fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
		let expires_at = ttl.map(|d| SystemTime::now() + d);
		Self { value, expires_at }
	}

	fn is_expired(&self) -> bool {
		match self.expires_at {
			Some(expires_at) => SystemTime::now() > expires_at,
			None => false,
		}
	}
}

/// In-memory cache backend
#[derive(Clone, Default)]
pub struct InMemoryCache {
	store: Arc<RwLock<HashMap<String, CacheEntry>>>,
	default_ttl: Option<Duration>,
}

impl InMemoryCache {
	/// Create a new in-memory cache with no default TTL
	pub fn new() -> Self {
		Self::default()
	}

	/// Set a default TTL applied when `set` is called without one
	pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
		self.default_ttl = Some(ttl);
		self
	}

	/// Remove expired entries
	pub async fn cleanup_expired(&self) {
		let mut store = self.store.write().await;
		store.retain(|_, entry| !entry.is_expired());
	}
}

#[async_trait]
impl CacheBackend for InMemoryCache {
	async fn get<T>(&self, key: &str) -> PageResult<Option<T>>
	where
		T: for<'de> Deserialize<'de> + Send,
	{
		let store = self.store.read().await;

		match store.get(key) {
			Some(entry) if !entry.is_expired() => {
				let value = serde_json::from_slice(&entry.value)
					.map_err(|e| PageError::Serialization(e.to_string()))?;
				Ok(Some(value))
			}
			// Expired entries count as misses; cleanup reclaims them later
			_ => Ok(None),
		}
	}

	async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> PageResult<()>
	where
		T: Serialize + Send + Sync,
	{
		let serialized =
			serde_json::to_vec(value).map_err(|e| PageError::Serialization(e.to_string()))?;

		let entry = CacheEntry::new(serialized, ttl.or(self.default_ttl));

		let mut store = self.store.write().await;
		store.insert(key.to_string(), entry);
		Ok(())
	}

	async fn delete(&self, key: &str) -> PageResult<()> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn has_key(&self, key: &str) -> PageResult<bool> {
		let store = self.store.read().await;
		Ok(store.get(key).is_some_and(|entry| !entry.is_expired()))
	}

	async fn clear(&self) -> PageResult<()> {
		let mut store = self.store.write().await;
		store.clear();
		Ok(())
	}
}

/// Default freshness window for cached page objects
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(30);

/// Time-bounded cache of fully loaded page documents, keyed by the page
/// id's string form, loading from the store on miss.
///
/// Concurrent duplicate loads for the same id are tolerated (last writer
/// wins); values are idempotent snapshots of the same record.
pub struct PageCache<B: CacheBackend = InMemoryCache> {
	backend: B,
	store: Arc<dyn PageStore>,
	ttl: Duration,
}

impl PageCache<InMemoryCache> {
	/// Create a page cache over an in-memory backend
	pub fn new(store: Arc<dyn PageStore>, ttl: Duration) -> Self {
		Self::with_backend(InMemoryCache::new(), store, ttl)
	}
}

impl<B: CacheBackend> PageCache<B> {
	/// Create a page cache over an explicit backend
	pub fn with_backend(backend: B, store: Arc<dyn PageStore>, ttl: Duration) -> Self {
		Self {
			backend,
			store,
			ttl,
		}
	}

	/// Get a page by id: cached value within the freshness window, or a
	/// store load that refills the cache.
	///
	/// A resolved id with no live record is [`PageError::PageNotFound`];
	/// the miss is not cached.
	pub async fn get(&self, id: PageId) -> PageResult<Page> {
		let key = id.to_string();

		if let Some(page) = self.backend.get::<Page>(&key).await? {
			return Ok(page);
		}

		let page = self
			.store
			.find_by_id(id)
			.await?
			.ok_or(PageError::PageNotFound(id))?;

		debug!(page = %id, "page cache refill");
		self.backend.set(&key, &page, Some(self.ttl)).await?;
		Ok(page)
	}

	/// Drop a single cached page
	pub async fn invalidate(&self, id: PageId) -> PageResult<()> {
		self.backend.delete(&id.to_string()).await
	}

	/// Drop every cached page
	pub async fn clear(&self) -> PageResult<()> {
		self.backend.clear().await
	}
}
