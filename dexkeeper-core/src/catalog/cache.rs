//! Process-lifetime memo of resolved section lists
//!
//! Keys are bounded by static configuration, so entries are never evicted
//! or invalidated. Each key owns a once-cell: concurrent requests for an
//! uncached key attach to the same pending resolution instead of starting
//! a second one.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

use super::game::{Game, Section};
use super::source::{CatalogSource, SectionCatalog};

/// Cache key for a section list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Remote catalog identifier
    Remote(String),
    /// Game and section identifiers of a locally-resolved section
    Local { game: String, section: String },
}

/// Memoizes section lists by [`CacheKey`]
#[derive(Default)]
pub struct CatalogCache {
    slots: Mutex<HashMap<CacheKey, Arc<OnceCell<SectionCatalog>>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored list for `key`, running `resolve` on first access
    ///
    /// `resolve` runs at most once per key, including under concurrent
    /// first access. Degraded lists are stored like any other.
    pub async fn get<F, Fut>(&self, key: CacheKey, resolve: F) -> SectionCatalog
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SectionCatalog>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        if let Some(hit) = slot.get() {
            debug!("Catalog cache hit for {:?}", key);
            return hit.clone();
        }

        slot.get_or_init(|| async {
            debug!("Catalog cache miss for {:?}", key);
            resolve().await
        })
        .await
        .clone()
    }

    /// Resolve a section through the cache
    ///
    /// Synthetic sections have no source of their own and are not cached.
    pub async fn resolve(&self, source: &CatalogSource, game: &Game, section: &Section) -> SectionCatalog {
        let section_source = game.source_of(section);
        match section_source.cache_key() {
            Some(key) => {
                self.get(key, || source.resolve_source(section_source))
                    .await
            }
            None => source.resolve_source(section_source).await,
        }
    }

    /// Whether a completed list is stored for `key`
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .is_some_and(|slot| slot.initialized())
    }

    /// Number of completed lists
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
