//! Per-patch artifact loading.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

use muster_types::{ArtifactKind, PatchId};

use crate::config::CatalogConfig;
use crate::source::DocumentSource;

/// Fetches individual patch artifacts on demand.
///
/// A missing artifact is a normal, silent outcome — patches publish only
/// the artifacts they need — and a malformed or failed fetch is treated
/// identically: the artifact simply contributes nothing. Results (including
/// misses) are cached; invalidation is explicit and total.
pub struct PatchDocumentLoader {
    source: Arc<dyn DocumentSource>,
    config: CatalogConfig,
    cache: RwLock<HashMap<(PatchId, ArtifactKind), Option<Value>>>,
}

impl PatchDocumentLoader {
    /// Create a loader over a document source.
    pub fn new(source: Arc<dyn DocumentSource>, config: CatalogConfig) -> Self {
        Self {
            source,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load one named artifact of one patch. `None` means "contributes
    /// nothing": the artifact is absent, unreachable, or malformed.
    pub async fn load_artifact(&self, id: &PatchId, kind: ArtifactKind) -> Option<Value> {
        let cache_key = (id.clone(), kind);
        {
            let cache = self.cache.read().expect("lock poisoned");
            if let Some(cached) = cache.get(&cache_key) {
                debug!(patch = %id, artifact = %kind, "artifact cache hit");
                return cached.clone();
            }
        }

        let key = self.config.artifact_key(id, kind);
        let fetched = match self.source.fetch(&key).await {
            Ok(Some(document)) => Some(document),
            Ok(None) => {
                debug!(patch = %id, artifact = %kind, "artifact not published");
                None
            }
            Err(err) => {
                warn!(patch = %id, artifact = %kind, %err, "artifact unavailable, treating as absent");
                None
            }
        };

        let mut cache = self.cache.write().expect("lock poisoned");
        cache.insert(cache_key, fetched.clone());
        fetched
    }

    /// Drop every cached artifact. Total, never partial.
    pub fn invalidate(&self) {
        self.cache.write().expect("lock poisoned").clear();
    }

    /// Number of cached artifact slots (hits and misses alike).
    pub fn cached_len(&self) -> usize {
        self.cache.read().expect("lock poisoned").len()
    }
}

impl std::fmt::Debug for PatchDocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchDocumentLoader")
            .field("cached_len", &self.cached_len())
            .finish()
    }
}
