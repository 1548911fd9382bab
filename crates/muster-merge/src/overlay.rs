//! The overlay algorithm: merge one value tree against another.
//!
//! `None` stands for "absent" on both sides: an absent base turns the
//! overlay into a pure addition, and a `None` result tells the caller to
//! remove the key from the parent mapping.

use serde_json::Value;

use muster_types::PatchId;

use crate::provenance::{tag_subtree, PATCHED_BY};

/// Merge an overlay value onto a base value.
///
/// - overlay `null` → `None` (the key is removed from its parent).
/// - base absent → deep copy of the overlay (addition).
/// - overlay scalar or sequence → deep copy of the overlay (full
///   replacement; sequences are never merged element-wise).
/// - both mappings → copy of base with each overlay key merged recursively;
///   `null` entries remove the corresponding key.
///
/// Pure: neither input is mutated.
pub fn merge_value(base: Option<&Value>, overlay: &Value) -> Option<Value> {
    match (base, overlay) {
        (_, Value::Null) => None,
        (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
            let mut result = base_map.clone();
            for (key, overlay_val) in overlay_map {
                match merge_value(base_map.get(key), overlay_val) {
                    Some(merged) => result.insert(key.clone(), merged),
                    None => result.remove(key),
                };
            }
            Some(Value::Object(result))
        }
        // Addition, scalar replacement, and whole-sequence replacement all
        // reduce to a deep copy of the overlay.
        _ => Some(overlay.clone()),
    }
}

/// [`merge_value`] with provenance: every mapping the overlay touches or
/// introduces is stamped with `patchedBy: <patch>`.
///
/// A later patch merging over the same node overwrites the tag, so the tag
/// always names the last contributor. Base-only nodes are left untouched.
pub fn merge_tagged(base: Option<&Value>, overlay: &Value, patch: &PatchId) -> Option<Value> {
    match (base, overlay) {
        (_, Value::Null) => None,
        (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
            let mut result = base_map.clone();
            for (key, overlay_val) in overlay_map {
                match merge_tagged(base_map.get(key), overlay_val, patch) {
                    Some(merged) => result.insert(key.clone(), merged),
                    None => result.remove(key),
                };
            }
            result.insert(PATCHED_BY.to_owned(), Value::String(patch.to_string()));
            Some(Value::Object(result))
        }
        // Introduced or replacing subtree: deep copy with every mapping
        // inside it tagged.
        _ => Some(tag_subtree(overlay.clone(), patch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // Delete sentinel
    // -----------------------------------------------------------------------

    #[test]
    fn null_overlay_removes_any_base() {
        for base in [
            json!(1),
            json!("spearmen"),
            json!([1, 2, 3]),
            json!({"a": 1}),
            json!(null),
        ] {
            assert_eq!(merge_value(Some(&base), &Value::Null), None);
        }
    }

    #[test]
    fn null_entry_removes_key_from_mapping() {
        let base = json!({"keep": 1, "drop": 2});
        let overlay = json!({"drop": null});
        let merged = merge_value(Some(&base), &overlay).unwrap();
        assert_eq!(merged, json!({"keep": 1}));
    }

    #[test]
    fn null_entry_for_missing_key_is_noop() {
        let base = json!({"keep": 1});
        let overlay = json!({"ghost": null});
        let merged = merge_value(Some(&base), &overlay).unwrap();
        assert_eq!(merged, base);
    }

    // -----------------------------------------------------------------------
    // Addition
    // -----------------------------------------------------------------------

    #[test]
    fn absent_base_deep_copies_overlay() {
        let overlay = json!({"units": ["spearmen"], "limit": {"min": 0, "note": null}});
        let merged = merge_value(None, &overlay).unwrap();
        assert_eq!(merged, overlay);
    }

    // -----------------------------------------------------------------------
    // Full replacement
    // -----------------------------------------------------------------------

    #[test]
    fn sequence_overlay_replaces_regardless_of_base_shape() {
        let overlay = json!(["a", "b"]);
        for base in [json!([1, 2, 3]), json!({"x": 1}), json!("scalar")] {
            let merged = merge_value(Some(&base), &overlay).unwrap();
            assert_eq!(merged, overlay);
        }
    }

    #[test]
    fn scalar_overlay_replaces_mapping() {
        let base = json!({"nested": {"a": 1}});
        let merged = merge_value(Some(&base), &json!(42)).unwrap();
        assert_eq!(merged, json!(42));
    }

    #[test]
    fn mapping_overlay_replaces_scalar_base() {
        let base = json!(7);
        let overlay = json!({"a": 1});
        let merged = merge_value(Some(&base), &overlay).unwrap();
        assert_eq!(merged, overlay);
    }

    // -----------------------------------------------------------------------
    // Recursive mapping merge
    // -----------------------------------------------------------------------

    #[test]
    fn disjoint_mappings_merge_to_union() {
        let base = json!({"a": 1, "b": {"c": 2}});
        let overlay = json!({"d": 3, "e": [4]});
        let merged = merge_value(Some(&base), &overlay).unwrap();
        assert_eq!(merged, json!({"a": 1, "b": {"c": 2}, "d": 3, "e": [4]}));
    }

    #[test]
    fn nested_keys_merge_recursively() {
        let base = json!({"empire": {"units": ["spearmen"], "limit": 10}});
        let overlay = json!({"empire": {"units": ["spearmen", "pistoliers"]}});
        let merged = merge_value(Some(&base), &overlay).unwrap();
        assert_eq!(
            merged,
            json!({"empire": {"units": ["spearmen", "pistoliers"], "limit": 10}})
        );
    }

    #[test]
    fn overlay_wins_scalar_conflicts() {
        let base = json!({"points": 2000});
        let overlay = json!({"points": 2500});
        let merged = merge_value(Some(&base), &overlay).unwrap();
        assert_eq!(merged, json!({"points": 2500}));
    }

    #[test]
    fn inputs_are_not_mutated() {
        let base = json!({"a": {"b": 1}});
        let overlay = json!({"a": {"c": 2}, "d": null});
        let base_before = base.clone();
        let overlay_before = overlay.clone();
        let _ = merge_value(Some(&base), &overlay);
        assert_eq!(base, base_before);
        assert_eq!(overlay, overlay_before);
    }

    // -----------------------------------------------------------------------
    // Provenance tagging
    // -----------------------------------------------------------------------

    #[test]
    fn touched_mapping_is_tagged() {
        let base = json!({"empire": {"units": ["spearmen"]}});
        let overlay = json!({"empire": {"units": ["spearmen", "pistoliers"]}});
        let patch = PatchId::new("P1");
        let merged = merge_tagged(Some(&base), &overlay, &patch).unwrap();
        assert_eq!(
            merged,
            json!({
                "empire": {"units": ["spearmen", "pistoliers"], "patchedBy": "P1"},
                "patchedBy": "P1"
            })
        );
    }

    #[test]
    fn untouched_sibling_carries_no_tag() {
        let base = json!({"empire": {"limit": 1}, "dwarfs": {"limit": 2}});
        let overlay = json!({"empire": {"limit": 3}});
        let patch = PatchId::new("P1");
        let merged = merge_tagged(Some(&base), &overlay, &patch).unwrap();
        assert_eq!(merged["dwarfs"], json!({"limit": 2}));
        assert_eq!(merged["empire"]["patchedBy"], json!("P1"));
    }

    #[test]
    fn later_patch_overwrites_tag() {
        let base = json!({"empire": {"limit": 1}});
        let patch_a = PatchId::new("A");
        let patch_b = PatchId::new("B");
        let first = merge_tagged(Some(&base), &json!({"empire": {"limit": 2}}), &patch_a).unwrap();
        let second =
            merge_tagged(Some(&first), &json!({"empire": {"limit": 3}}), &patch_b).unwrap();
        assert_eq!(second["empire"]["patchedBy"], json!("B"));
        assert_eq!(second["empire"]["limit"], json!(3));
    }

    #[test]
    fn introduced_subtree_is_tagged_recursively() {
        let base = json!({});
        let overlay = json!({"kislev": {"units": {"bears": {"points": 100}}}});
        let patch = PatchId::new("P9");
        let merged = merge_tagged(Some(&base), &overlay, &patch).unwrap();
        assert_eq!(merged["kislev"]["patchedBy"], json!("P9"));
        assert_eq!(merged["kislev"]["units"]["patchedBy"], json!("P9"));
        assert_eq!(merged["kislev"]["units"]["bears"]["patchedBy"], json!("P9"));
    }

    #[test]
    fn tagged_delete_still_removes() {
        let base = json!({"empire": {"old": 1, "keep": 2}});
        let overlay = json!({"empire": {"old": null}});
        let patch = PatchId::new("P1");
        let merged = merge_tagged(Some(&base), &overlay, &patch).unwrap();
        assert_eq!(
            merged["empire"],
            json!({"keep": 2, "patchedBy": "P1"})
        );
    }
}
