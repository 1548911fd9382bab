use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Logical identity of a patch.
///
/// Patch ids are host-supplied opaque strings (e.g. `"errata-2024"`). They
/// are the key under which a patch's artifacts are requested and the value
/// carried by provenance tags on merged nodes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchId(String);

impl PatchId {
    /// Create a patch id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PatchId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PatchId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatchId({})", self.0)
    }
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a patch applies to the base dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    /// Merge the patch's subtrees into the base (the common case).
    #[default]
    Patch,
    /// Wholesale-replace each named subtree instead of merging into it.
    Full,
}

impl PatchKind {
    /// Returns `true` for the subtree-replacing kind.
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Free-form descriptor metadata.
///
/// Catalogs in the wild carry dependency lists either at the descriptor's
/// top level or nested under its metadata; both spellings are accepted and
/// unified by [`PatchDescriptor::dependencies`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchMetadata {
    /// Human-readable name, if the catalog supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Patch ids that must be applied before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PatchId>,
    /// Any remaining metadata fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PatchMetadata {
    /// Returns `true` if no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.dependencies.is_empty() && self.extra.is_empty()
    }
}

/// One entry of the patch catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchDescriptor {
    /// The patch's logical identity.
    pub id: PatchId,
    /// Merge-in or wholesale-replace. Catalogs may spell this `type`.
    #[serde(default, alias = "type")]
    pub kind: PatchKind,
    /// Top-level dependency list (some catalogs nest it in metadata instead).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PatchId>,
    /// Descriptor metadata. Catalogs may spell this `meta`.
    #[serde(default, alias = "meta", skip_serializing_if = "PatchMetadata::is_empty")]
    pub metadata: PatchMetadata,
}

impl PatchDescriptor {
    /// Create a plain descriptor with no dependencies or metadata.
    pub fn new(id: impl Into<PatchId>, kind: PatchKind) -> Self {
        Self {
            id: id.into(),
            kind,
            dependencies: Vec::new(),
            metadata: PatchMetadata::default(),
        }
    }

    /// Add dependencies, builder-style.
    pub fn with_dependencies<I, T>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PatchId>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// The declared prerequisites of this patch.
    ///
    /// Reads the top-level list when present, falling back to the metadata
    /// list otherwise.
    pub fn dependencies(&self) -> &[PatchId] {
        if !self.dependencies.is_empty() {
            &self.dependencies
        } else {
            &self.metadata.dependencies
        }
    }

    /// Human-readable name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.metadata
            .display_name
            .as_deref()
            .unwrap_or_else(|| self.id.as_str())
    }
}
