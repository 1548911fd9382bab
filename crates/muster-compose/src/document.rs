use serde_json::Value;

use muster_types::{PatchId, PatchKind};

/// One loaded patch document, ready to fold into a composition.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchDocument {
    pub id: PatchId,
    pub kind: PatchKind,
    pub data: Value,
}

impl PatchDocument {
    pub fn new(id: impl Into<PatchId>, kind: PatchKind, data: Value) -> Self {
        Self {
            id: id.into(),
            kind,
            data,
        }
    }

    /// The rules payload of this document: the `rules` subtree when the
    /// document wraps one, otherwise the document itself.
    pub fn rules_payload(&self) -> &Value {
        self.data.get("rules").unwrap_or(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rules_payload_prefers_wrapped_subtree() {
        let doc = PatchDocument::new(
            "p1",
            PatchKind::Patch,
            json!({"rules": {"empire": {}}, "notes": "ignored"}),
        );
        assert_eq!(doc.rules_payload(), &json!({"empire": {}}));
    }

    #[test]
    fn rules_payload_falls_back_to_document() {
        let doc = PatchDocument::new("p1", PatchKind::Patch, json!({"empire": {}}));
        assert_eq!(doc.rules_payload(), &json!({"empire": {}}));
    }
}
