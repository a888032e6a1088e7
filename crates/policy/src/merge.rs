use crate::value::{PolicyDocument, PolicyValue};

/// Fold policy documents left to right into one.
///
/// Sequences are concatenated, nested mappings are merged with the same
/// rule, anything else is replaced by the later document. Nothing is ever
/// removed: a later document cannot take an entry out of a list.
pub fn merge_policies<I>(documents: I) -> PolicyDocument
where
    I: IntoIterator<Item = PolicyDocument>,
{
    documents
        .into_iter()
        .fold(PolicyDocument::new(), |mut merged, document| {
            merge_into(&mut merged, document);
            merged
        })
}

fn merge_into(merged: &mut PolicyDocument, incoming: PolicyDocument) {
    for (key, value) in incoming {
        let combined = match (merged.remove(&key), value) {
            (Some(PolicyValue::Sequence(mut existing)), PolicyValue::Sequence(items)) => {
                existing.extend(items);
                PolicyValue::Sequence(existing)
            }
            (Some(PolicyValue::Mapping(mut existing)), PolicyValue::Mapping(nested)) => {
                merge_into(&mut existing, nested);
                PolicyValue::Mapping(existing)
            }
            (_, value) => value,
        };
        merged.insert(key, combined);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> PolicyDocument {
        match PolicyValue::from(value) {
            PolicyValue::Mapping(map) => map,
            other => panic!("not a mapping: {:?}", other),
        }
    }

    #[test]
    fn test_sequences_concatenate() {
        let merged = merge_policies(vec![
            doc(json!({"denylist": ["a.com"]})),
            doc(json!({"denylist": ["b.com", "a.com"]})),
        ]);
        let list = merged["denylist"].as_sequence().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[2].as_str(), Some("a.com"));
    }

    #[test]
    fn test_later_scalar_wins() {
        let merged = merge_policies(vec![
            doc(json!({"enabled": true, "mode": "strict"})),
            doc(json!({"enabled": false})),
        ]);
        assert_eq!(merged["enabled"].as_bool(), Some(false));
        assert_eq!(merged["mode"].as_str(), Some("strict"));
    }

    #[test]
    fn test_nested_mappings_recurse() {
        let merged = merge_policies(vec![
            doc(json!({"net": {"hosts": ["a"], "timeout": 5}})),
            doc(json!({"net": {"hosts": ["b"], "retries": 2}})),
        ]);
        let net = merged["net"].as_mapping().unwrap();
        assert_eq!(net["hosts"].as_sequence().unwrap().len(), 2);
        assert!(net.contains_key("timeout"));
        assert!(net.contains_key("retries"));
    }

    #[test]
    fn test_type_change_replaces() {
        let merged = merge_policies(vec![
            doc(json!({"rules": ["a"]})),
            doc(json!({"rules": {"a": true}})),
        ]);
        assert!(merged["rules"].as_mapping().is_some());

        let merged = merge_policies(vec![
            doc(json!({"rules": {"a": true}})),
            doc(json!({"rules": "off"})),
        ]);
        assert_eq!(merged["rules"].as_str(), Some("off"));
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_policies(Vec::new()).is_empty());
    }
}
