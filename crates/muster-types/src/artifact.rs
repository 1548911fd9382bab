use std::fmt;

use serde::{Deserialize, Serialize};

use crate::patch::PatchKind;

/// The named documents a single patch may publish.
///
/// Artifacts are requested by logical key; which artifacts a patch actually
/// provides is discovered by fetching them — a missing artifact is a normal
/// outcome, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Per-faction rule amendments.
    Rules,
    /// Dataset overlay merged into the base (for `kind = patch` entries).
    Data,
    /// Wholesale dataset replacement (for `kind = full` entries).
    Full,
    /// Localized strings contributed by the patch.
    Locale,
    /// Localized human-readable summary of what the patch changes.
    Brief,
}

impl ArtifactKind {
    /// The key segment under which this artifact lives, e.g.
    /// `patches/<id>/rules`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Data => "patch",
            Self::Full => "full",
            Self::Locale => "locale",
            Self::Brief => "brief",
        }
    }

    /// The data artifact matching a descriptor's kind: full-kind patches
    /// publish a replacement document, everything else an overlay.
    pub fn data_for(kind: PatchKind) -> Self {
        if kind.is_full() {
            Self::Full
        } else {
            Self::Data
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stems_match_published_layout() {
        assert_eq!(ArtifactKind::Rules.file_stem(), "rules");
        assert_eq!(ArtifactKind::Data.file_stem(), "patch");
        assert_eq!(ArtifactKind::Full.file_stem(), "full");
        assert_eq!(ArtifactKind::Locale.file_stem(), "locale");
        assert_eq!(ArtifactKind::Brief.file_stem(), "brief");
    }

    #[test]
    fn data_artifact_follows_patch_kind() {
        assert_eq!(ArtifactKind::data_for(PatchKind::Patch), ArtifactKind::Data);
        assert_eq!(ArtifactKind::data_for(PatchKind::Full), ArtifactKind::Full);
    }

    #[test]
    fn display_matches_stem() {
        assert_eq!(format!("{}", ArtifactKind::Brief), "brief");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&ArtifactKind::Locale).unwrap();
        assert_eq!(json, "\"locale\"");
        let parsed: ArtifactKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ArtifactKind::Locale);
    }
}
