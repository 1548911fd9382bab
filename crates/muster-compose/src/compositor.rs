//! Folding base documents through ordered patch documents.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use muster_catalog::{DocumentSource, PatchDocumentLoader};
use muster_merge::{merge_tagged, merge_value, tag_subtree};
use muster_types::{ArtifactKind, PatchDescriptor};

use crate::document::PatchDocument;

/// Drives compositions: loads the base and patch documents and folds them
/// left-to-right through the merge engine.
pub struct Compositor {
    source: Arc<dyn DocumentSource>,
    loader: Arc<PatchDocumentLoader>,
}

impl Compositor {
    pub fn new(source: Arc<dyn DocumentSource>, loader: Arc<PatchDocumentLoader>) -> Self {
        Self { source, loader }
    }

    /// Load the given artifact of each selected patch, in selection order.
    ///
    /// Patches lacking the artifact are skipped; they contribute nothing.
    pub async fn load_patch_documents(
        &self,
        patches: &[PatchDescriptor],
        kind: ArtifactKind,
    ) -> Vec<PatchDocument> {
        let mut documents = Vec::with_capacity(patches.len());
        for descriptor in patches {
            match self.loader.load_artifact(&descriptor.id, kind).await {
                Some(data) => {
                    documents.push(PatchDocument::new(
                        descriptor.id.clone(),
                        descriptor.kind,
                        data,
                    ));
                }
                None => {
                    debug!(patch = %descriptor.id, artifact = %kind, "patch contributes nothing");
                }
            }
        }
        documents
    }

    /// Load each patch's *data* artifact: `full` for full-kind patches,
    /// the overlay document otherwise.
    pub async fn load_data_documents(&self, patches: &[PatchDescriptor]) -> Vec<PatchDocument> {
        let mut documents = Vec::with_capacity(patches.len());
        for descriptor in patches {
            let kind = ArtifactKind::data_for(descriptor.kind);
            match self.loader.load_artifact(&descriptor.id, kind).await {
                Some(data) => {
                    documents.push(PatchDocument::new(
                        descriptor.id.clone(),
                        descriptor.kind,
                        data,
                    ));
                }
                None => {
                    debug!(patch = %descriptor.id, artifact = %kind, "patch contributes nothing");
                }
            }
        }
        documents
    }

    /// Compose a base document (by logical key) with the given artifact of
    /// each selected patch. An empty selection returns the base unchanged;
    /// a missing base degrades to an empty mapping.
    pub async fn compose_document(
        &self,
        base_key: &str,
        patches: &[PatchDescriptor],
        kind: ArtifactKind,
    ) -> Value {
        let base = match self.source.fetch(base_key).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                warn!(key = base_key, "base document missing, composing over empty mapping");
                Value::Object(Map::new())
            }
            Err(err) => {
                warn!(key = base_key, %err, "base document unavailable, composing over empty mapping");
                Value::Object(Map::new())
            }
        };
        if patches.is_empty() {
            return base;
        }

        let documents = self.load_patch_documents(patches, kind).await;
        let mut merged = base;
        for document in &documents {
            merged = merge_value(Some(&merged), &document.data).unwrap_or(Value::Null);
        }
        merged
    }

    /// Load rules artifacts for the selection and compose them onto a base
    /// rules tree.
    pub async fn compose_rules_for(
        &self,
        base_rules: &Value,
        patches: &[PatchDescriptor],
    ) -> Value {
        if patches.is_empty() {
            return base_rules.clone();
        }
        let documents = self.load_patch_documents(patches, ArtifactKind::Rules).await;
        compose_rules(base_rules, &documents)
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor").finish_non_exhaustive()
    }
}

/// Compose faction-keyed rule trees.
///
/// Each patch's rules payload is a mapping from faction id to rule subtree.
/// Full-kind patches replace a faction's whole subtree; everything else
/// merges in. Every mapping a patch touches or introduces is tagged with
/// that patch's id, so the tag always names the last contributor.
pub fn compose_rules(base_rules: &Value, patches: &[PatchDocument]) -> Value {
    let mut factions = match base_rules {
        Value::Object(map) => map.clone(),
        other => {
            warn!("base rules are not a mapping, returning them unchanged");
            return other.clone();
        }
    };

    for patch in patches {
        let payload = patch.rules_payload();
        let Some(contributions) = payload.as_object() else {
            debug!(patch = %patch.id, "rules payload is not a mapping, skipped");
            continue;
        };
        for (faction, subtree) in contributions {
            if patch.kind.is_full() {
                if subtree.is_null() {
                    factions.remove(faction);
                } else {
                    factions.insert(faction.clone(), tag_subtree(subtree.clone(), &patch.id));
                }
                continue;
            }
            match merge_tagged(factions.get(faction), subtree, &patch.id) {
                Some(merged) => factions.insert(faction.clone(), merged),
                None => factions.remove(faction),
            };
        }
    }

    Value::Object(factions)
}

/// Compose a multi-section document: each named top-level section merges
/// independently, and a patch may contribute to any subset of sections.
pub fn compose_mixed(base: &Value, patches: &[PatchDocument]) -> Value {
    let mut sections = match base {
        Value::Object(map) => map.clone(),
        other => {
            warn!("base document is not a mapping, returning it unchanged");
            return other.clone();
        }
    };

    for patch in patches {
        let Some(contributions) = patch.data.as_object() else {
            debug!(patch = %patch.id, "patch document is not a mapping, skipped");
            continue;
        };
        for (section, overlay) in contributions {
            if patch.kind.is_full() {
                if overlay.is_null() {
                    sections.remove(section);
                } else {
                    sections.insert(section.clone(), tag_subtree(overlay.clone(), &patch.id));
                }
                continue;
            }
            match merge_tagged(sections.get(section), overlay, &patch.id) {
                Some(merged) => sections.insert(section.clone(), merged),
                None => sections.remove(section),
            };
        }
    }

    Value::Object(sections)
}
