use serde::{Deserialize, Serialize};

use muster_types::{ArtifactKind, PatchId};

/// Logical-key layout of the published patch directory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Key of the catalog index document.
    pub index_key: String,
    /// Key prefix under which per-patch artifacts live.
    pub patch_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_key: "patches/index".to_owned(),
            patch_prefix: "patches".to_owned(),
        }
    }
}

impl CatalogConfig {
    /// The logical key of one patch artifact, e.g. `patches/errata/rules`.
    pub fn artifact_key(&self, id: &PatchId, kind: ArtifactKind) -> String {
        format!("{}/{}/{}", self.patch_prefix, id, kind.file_stem())
    }
}
