//! The engine facade: load, order, compose, publish.

use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};
use tracing::{debug, info};

use muster_bus::PatchBus;
use muster_catalog::{CatalogConfig, DocumentSource, PatchCatalog, PatchDocumentLoader};
use muster_compose::{Compositor, RecomposeGate};
use muster_order::SelectionOrderer;
use muster_types::{AppliedPatch, ArtifactKind, PatchDescriptor, PatchId, PatchKind};

use crate::error::{EngineError, EngineResult};

/// High-level patch overlay API.
///
/// Owns the catalog, document loader, and compositor, plus the base-rules
/// snapshot the rest of the application composes against. Confirmed
/// selections are published on the shared [`PatchBus`]; overlapping
/// confirms are resolved last-request-wins through a recompose gate.
pub struct OverlayEngine {
    catalog: PatchCatalog,
    loader: Arc<PatchDocumentLoader>,
    compositor: Compositor,
    bus: Arc<PatchBus>,
    base_rules: RwLock<Option<Value>>,
    gate: RecomposeGate,
}

impl OverlayEngine {
    /// Build an engine over a document source, publishing to the given bus.
    pub fn new(source: Arc<dyn DocumentSource>, config: CatalogConfig, bus: Arc<PatchBus>) -> Self {
        let loader = Arc::new(PatchDocumentLoader::new(Arc::clone(&source), config.clone()));
        let compositor = Compositor::new(Arc::clone(&source), Arc::clone(&loader));
        let catalog = PatchCatalog::new(source, config);
        Self {
            catalog,
            loader,
            compositor,
            bus,
            base_rules: RwLock::new(None),
            gate: RecomposeGate::new(),
        }
    }

    /// The bus this engine publishes to.
    pub fn bus(&self) -> &PatchBus {
        &self.bus
    }

    /// The compositor, for callers composing their own documents.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    // ---------------------------------------------------------------
    // Base snapshot
    // ---------------------------------------------------------------

    /// Install the base rules snapshot selections are composed against.
    pub fn set_base_rules(&self, rules: Value) {
        *self.base_rules.write().expect("engine lock poisoned") = Some(rules);
    }

    fn base_snapshot(&self) -> EngineResult<Value> {
        self.base_rules
            .read()
            .expect("engine lock poisoned")
            .clone()
            .ok_or(EngineError::BaseRulesMissing)
    }

    // ---------------------------------------------------------------
    // Catalog
    // ---------------------------------------------------------------

    /// The available patch descriptors (cached).
    pub async fn available_patches(&self) -> Vec<PatchDescriptor> {
        self.catalog.load().await
    }

    /// Bust the catalog and artifact caches and refetch the directory.
    pub async fn reload_catalog(&self) -> Vec<PatchDescriptor> {
        self.loader.invalidate();
        self.catalog.reload().await
    }

    /// An orderer over the current catalog.
    pub async fn orderer(&self) -> SelectionOrderer {
        SelectionOrderer::new(self.catalog.load().await)
    }

    /// Resolve ids against the catalog; ids the catalog does not know
    /// default to plain merge-kind descriptors.
    async fn descriptors_for(&self, ids: &[PatchId]) -> Vec<PatchDescriptor> {
        let available = self.catalog.load().await;
        ids.iter()
            .map(|id| {
                available
                    .iter()
                    .find(|d| &d.id == id)
                    .cloned()
                    .unwrap_or_else(|| PatchDescriptor::new(id.clone(), PatchKind::Patch))
            })
            .collect()
    }

    // ---------------------------------------------------------------
    // Artifact loading
    // ---------------------------------------------------------------

    /// Load the applied form of each selected patch: its data artifact
    /// (overlay or full replacement) plus its locale, with the display
    /// name resolved from the locale's `patch-name` entry when present.
    ///
    /// Patches whose data artifact is absent contribute nothing.
    pub async fn load_applied(&self, order: &[PatchId]) -> Vec<AppliedPatch> {
        let descriptors = self.descriptors_for(order).await;
        let mut applied = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            let kind = ArtifactKind::data_for(descriptor.kind);
            let Some(data) = self.loader.load_artifact(&descriptor.id, kind).await else {
                debug!(patch = %descriptor.id, "data artifact absent, patch contributes nothing");
                continue;
            };
            let locale = self
                .loader
                .load_artifact(&descriptor.id, ArtifactKind::Locale)
                .await;
            let display_name = locale
                .as_ref()
                .and_then(display_name_from_locale)
                .unwrap_or_else(|| descriptor.display_name().to_owned());
            applied.push(AppliedPatch {
                id: descriptor.id.clone(),
                kind: descriptor.kind,
                display_name,
                data,
                locale,
            });
        }
        applied
    }

    /// A patch's localized brief, when it publishes one.
    pub async fn patch_brief(&self, id: &PatchId) -> Option<Value> {
        self.loader.load_artifact(id, ArtifactKind::Brief).await
    }

    // ---------------------------------------------------------------
    // Composition & confirm
    // ---------------------------------------------------------------

    /// Compose the base rules snapshot with the given selection.
    ///
    /// The selection is normalized first so dependencies precede their
    /// dependents; an empty selection returns a copy of the base snapshot.
    pub async fn merged_rules_for(&self, ids: &[PatchId]) -> EngineResult<Value> {
        let base = self.base_snapshot()?;
        if ids.is_empty() {
            return Ok(base);
        }
        let orderer = self.orderer().await;
        let order = orderer.normalize(ids)?;
        let descriptors = self.descriptors_for(&order).await;
        Ok(self.compositor.compose_rules_for(&base, &descriptors).await)
    }

    /// Confirm a selection: normalize, recompose, and publish on the bus.
    ///
    /// Returns `Ok(false)` when a newer confirm superseded this one while
    /// its documents were loading — the stale result is discarded without
    /// touching the bus.
    pub async fn confirm(&self, ids: &[PatchId]) -> EngineResult<bool> {
        let base = self.base_snapshot()?;
        let orderer = self.orderer().await;
        let order = orderer.normalize(ids)?;
        let ticket = self.gate.begin();

        let descriptors = self.descriptors_for(&order).await;
        let applied = self.load_applied(&order).await;
        let rules = self.compositor.compose_rules_for(&base, &descriptors).await;

        let mut locale_entries = Map::new();
        for patch in &applied {
            if let Some(Value::Object(entries)) = &patch.locale {
                for (key, value) in entries {
                    locale_entries.insert(key.clone(), value.clone());
                }
            }
        }

        if !self.gate.is_current(&ticket) {
            debug!(count = order.len(), "confirm superseded by a newer selection, discarding");
            return Ok(false);
        }

        let rules_entries = rules.as_object().cloned().unwrap_or_default();
        self.bus.set_confirmed(applied);
        self.bus.set_rules_map(rules_entries);
        self.bus.set_locale_map(locale_entries);
        info!(count = order.len(), "selection confirmed and published");
        Ok(true)
    }
}

impl std::fmt::Debug for OverlayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayEngine").finish_non_exhaustive()
    }
}

/// Resolve a display name from a locale artifact's `patch-name` entry.
fn display_name_from_locale(locale: &Value) -> Option<String> {
    let entry = locale.get("patch-name")?;
    entry
        .get("name")
        .or_else(|| entry.get("name_en"))?
        .as_str()
        .map(str::to_owned)
}
