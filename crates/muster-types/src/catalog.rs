use std::collections::BTreeMap;

use serde::Deserialize;

use crate::patch::{PatchDescriptor, PatchId, PatchKind, PatchMetadata};

/// Descriptor fields without the id, as they appear in the mapping-shaped
/// catalog where the id is the key.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DescriptorFields {
    #[serde(default, alias = "type")]
    pub kind: PatchKind,
    #[serde(default)]
    pub dependencies: Vec<PatchId>,
    #[serde(default, alias = "meta")]
    pub metadata: PatchMetadata,
}

impl DescriptorFields {
    fn into_descriptor(self, id: PatchId) -> PatchDescriptor {
        PatchDescriptor {
            id,
            kind: self.kind,
            dependencies: self.dependencies,
            metadata: self.metadata,
        }
    }
}

/// The accepted catalog document shapes.
///
/// Hosts publish the catalog as a bare sequence of descriptors, a wrapped
/// `{"patches": [...]}` object, or a mapping of id to descriptor fields. All
/// three resolve to one canonical descriptor sequence via [`normalize`].
///
/// [`normalize`]: CatalogDocument::normalize
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum CatalogDocument {
    /// `[{"id": "p1", ...}, ...]`
    Sequence(Vec<PatchDescriptor>),
    /// `{"patches": [{"id": "p1", ...}, ...]}`
    Wrapped { patches: Vec<PatchDescriptor> },
    /// `{"p1": {...}, "p2": {...}}`
    ById(BTreeMap<String, DescriptorFields>),
}

impl CatalogDocument {
    /// Resolve the shape into the canonical descriptor sequence.
    ///
    /// The mapping shape is emitted sorted by id so normalization is
    /// deterministic regardless of the document's key order.
    pub fn normalize(self) -> Vec<PatchDescriptor> {
        match self {
            Self::Sequence(descriptors) => descriptors,
            Self::Wrapped { patches } => patches,
            Self::ById(map) => map
                .into_iter()
                .map(|(id, fields)| fields.into_descriptor(PatchId::new(id)))
                .collect(),
        }
    }
}
