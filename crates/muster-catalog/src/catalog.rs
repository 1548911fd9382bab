//! The cached, failure-absorbing patch directory.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use muster_types::{CatalogDocument, PatchDescriptor, PatchId};

use crate::config::CatalogConfig;
use crate::source::DocumentSource;

/// Cached directory of available patches.
///
/// The catalog document is fetched once and cached until an explicit
/// reload. Concurrent loads while a fetch is in flight are coalesced: the
/// cache is guarded by an async mutex held across the fetch, so late
/// callers queue on the lock and observe the freshly filled cache instead
/// of fetching again.
///
/// Every failure mode — source unavailable, document missing, document
/// malformed — degrades to an empty catalog. Patches are optional; their
/// absence must never block the base experience.
pub struct PatchCatalog {
    source: Arc<dyn DocumentSource>,
    config: CatalogConfig,
    cache: Mutex<Option<Vec<PatchDescriptor>>>,
}

impl PatchCatalog {
    /// Create a catalog over a document source.
    pub fn new(source: Arc<dyn DocumentSource>, config: CatalogConfig) -> Self {
        Self {
            source,
            config,
            cache: Mutex::new(None),
        }
    }

    /// The available patch descriptors, cached after the first load.
    pub async fn load(&self) -> Vec<PatchDescriptor> {
        self.load_with(false).await
    }

    /// Load the catalog, optionally bypassing the cache.
    pub async fn load_with(&self, force_reload: bool) -> Vec<PatchDescriptor> {
        let mut cache = self.cache.lock().await;
        if !force_reload {
            if let Some(descriptors) = cache.as_ref() {
                debug!(count = descriptors.len(), "catalog cache hit");
                return descriptors.clone();
            }
        }
        let descriptors = self.fetch_catalog().await;
        *cache = Some(descriptors.clone());
        descriptors
    }

    /// Explicit cache bust and refetch.
    pub async fn reload(&self) -> Vec<PatchDescriptor> {
        self.load_with(true).await
    }

    /// Look up one descriptor by id.
    pub async fn descriptor(&self, id: &PatchId) -> Option<PatchDescriptor> {
        self.load().await.into_iter().find(|d| &d.id == id)
    }

    async fn fetch_catalog(&self) -> Vec<PatchDescriptor> {
        let raw = match self.source.fetch(&self.config.index_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.config.index_key, "no catalog published");
                return Vec::new();
            }
            Err(err) => {
                warn!(%err, "catalog unavailable, continuing without patches");
                return Vec::new();
            }
        };
        match serde_json::from_value::<CatalogDocument>(raw) {
            Ok(document) => {
                let descriptors = document.normalize();
                debug!(count = descriptors.len(), "catalog loaded");
                descriptors
            }
            Err(err) => {
                warn!(%err, "catalog document malformed, continuing without patches");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for PatchCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchCatalog")
            .field("index_key", &self.config.index_key)
            .finish()
    }
}
