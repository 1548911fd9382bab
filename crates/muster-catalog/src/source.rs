use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{SourceError, SourceResult};

/// Asynchronous provider of documents by logical key.
///
/// Implementations resolve keys (e.g. `patches/index`,
/// `patches/errata-2024/rules`) to concrete locations; the engine itself
/// never constructs URLs. `Ok(None)` is the normal "document absent"
/// outcome; `Err` covers transport and parse failures.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, key: &str) -> SourceResult<Option<Value>>;
}

/// In-memory, HashMap-based document source.
///
/// Intended for tests and embedding. Keys can be poisoned to simulate an
/// unreachable source, and an optional latency makes in-flight overlap
/// observable. A fetch counter lets tests assert coalescing behavior.
#[derive(Default)]
pub struct InMemoryDocumentSource {
    documents: RwLock<HashMap<String, Value>>,
    poisoned: RwLock<HashSet<String>>,
    latency: Option<Duration>,
    fetches: AtomicUsize,
}

impl InMemoryDocumentSource {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a simulated per-fetch latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Publish a document under a logical key.
    pub fn insert(&self, key: impl Into<String>, document: Value) {
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(key.into(), document);
    }

    /// Remove a document. Returns `true` if it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.documents
            .write()
            .expect("lock poisoned")
            .remove(key)
            .is_some()
    }

    /// Make every fetch of `key` fail with [`SourceError::Unavailable`].
    pub fn poison(&self, key: impl Into<String>) {
        self.poisoned
            .write()
            .expect("lock poisoned")
            .insert(key.into());
    }

    /// Number of fetches served so far (including misses and failures).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocumentSource {
    async fn fetch(&self, key: &str) -> SourceResult<Option<Value>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.poisoned.read().expect("lock poisoned").contains(key) {
            return Err(SourceError::Unavailable {
                key: key.to_owned(),
                reason: "poisoned in test".to_owned(),
            });
        }
        let documents = self.documents.read().expect("lock poisoned");
        Ok(documents.get(key).cloned())
    }
}

impl std::fmt::Debug for InMemoryDocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentSource")
            .field(
                "document_count",
                &self.documents.read().expect("lock poisoned").len(),
            )
            .field("fetch_count", &self.fetch_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fetch_present_document() {
        let source = InMemoryDocumentSource::new();
        source.insert("patches/index", json!([{"id": "p1"}]));
        let fetched = source.fetch("patches/index").await.unwrap();
        assert_eq!(fetched, Some(json!([{"id": "p1"}])));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn fetch_absent_document_is_none() {
        let source = InMemoryDocumentSource::new();
        let fetched = source.fetch("patches/ghost/rules").await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn poisoned_key_fails() {
        let source = InMemoryDocumentSource::new();
        source.insert("patches/index", json!([]));
        source.poison("patches/index");
        let result = source.fetch("patches/index").await;
        assert!(matches!(result, Err(SourceError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn remove_unpublishes() {
        let source = InMemoryDocumentSource::new();
        source.insert("patches/p1/locale", json!({}));
        assert!(source.remove("patches/p1/locale"));
        assert!(!source.remove("patches/p1/locale"));
        assert!(source.fetch("patches/p1/locale").await.unwrap().is_none());
    }
}
