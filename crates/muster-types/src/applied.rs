use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::patch::{PatchId, PatchKind};

/// A confirmed patch together with its loaded artifacts.
///
/// This is the unit published on the shared bus: enough for consumers to
/// display the selection and for the compositor to re-derive merged views.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedPatch {
    pub id: PatchId,
    pub kind: PatchKind,
    /// Resolved human-readable name (locale-supplied, falling back to the id).
    pub display_name: String,
    /// The patch's data artifact (overlay or full replacement).
    pub data: Value,
    /// The patch's locale artifact, when it publishes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<Value>,
}

impl AppliedPatch {
    /// Construct an applied patch with the display name defaulted to the id.
    pub fn new(id: impl Into<PatchId>, kind: PatchKind, data: Value) -> Self {
        let id = id.into();
        let display_name = id.as_str().to_owned();
        Self {
            id,
            kind,
            display_name,
            data,
            locale: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_defaults_to_id() {
        let applied = AppliedPatch::new("p1", PatchKind::Patch, json!({}));
        assert_eq!(applied.display_name, "p1");
    }

    #[test]
    fn serde_roundtrip() {
        let applied = AppliedPatch {
            id: PatchId::new("p1"),
            kind: PatchKind::Full,
            display_name: "Errata".into(),
            data: json!({"empire": {"units": ["spearmen"]}}),
            locale: Some(json!({"patch-name": {"name": "Errata"}})),
        };
        let json = serde_json::to_string(&applied).unwrap();
        let parsed: AppliedPatch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, applied);
    }

    #[test]
    fn absent_locale_is_omitted() {
        let applied = AppliedPatch::new("p2", PatchKind::Patch, json!({}));
        let json = serde_json::to_string(&applied).unwrap();
        assert!(!json.contains("locale"));
    }
}
