//! Provenance markers on merged nodes.
//!
//! Merged mappings may carry a `patchedBy` field naming the last patch that
//! supplied or modified them. The field is additive metadata: consumers that
//! do not understand it can ignore it safely, and base-only nodes never
//! carry it.

use serde_json::Value;

use muster_types::PatchId;

/// Name of the provenance field attached to merged mappings.
pub const PATCHED_BY: &str = "patchedBy";

/// Deep-tag an introduced or replacing subtree.
///
/// Every mapping in the subtree (including mappings inside sequences) is
/// stamped with the contributing patch id. Scalars and sequences themselves
/// cannot carry tags and pass through unchanged.
pub fn tag_subtree(value: Value, patch: &PatchId) -> Value {
    match value {
        Value::Object(map) => {
            let mut tagged: serde_json::Map<String, Value> = map
                .into_iter()
                .map(|(key, val)| (key, tag_subtree(val, patch)))
                .collect();
            tagged.insert(PATCHED_BY.to_owned(), Value::String(patch.to_string()));
            Value::Object(tagged)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| tag_subtree(item, patch))
                .collect(),
        ),
        other => other,
    }
}

/// The patch id a merged mapping was last touched by, if any.
pub fn provenance(value: &Value) -> Option<&str> {
    value.as_object()?.get(PATCHED_BY)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_nested_mappings() {
        let patch = PatchId::new("P1");
        let tagged = tag_subtree(json!({"a": {"b": 1}}), &patch);
        assert_eq!(
            tagged,
            json!({"a": {"b": 1, "patchedBy": "P1"}, "patchedBy": "P1"})
        );
    }

    #[test]
    fn tags_mappings_inside_sequences() {
        let patch = PatchId::new("P2");
        let tagged = tag_subtree(json!([{"name": "spearmen"}, 7]), &patch);
        assert_eq!(
            tagged,
            json!([{"name": "spearmen", "patchedBy": "P2"}, 7])
        );
    }

    #[test]
    fn scalars_pass_through() {
        let patch = PatchId::new("P3");
        assert_eq!(tag_subtree(json!("text"), &patch), json!("text"));
        assert_eq!(tag_subtree(json!(null), &patch), json!(null));
    }

    #[test]
    fn provenance_reads_tag() {
        let value = json!({"patchedBy": "P4", "units": []});
        assert_eq!(provenance(&value), Some("P4"));
        assert_eq!(provenance(&json!({"units": []})), None);
        assert_eq!(provenance(&json!([1, 2])), None);
    }
}
