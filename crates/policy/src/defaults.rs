use crate::value::{PolicyDocument, PolicyValue};

/// Policy domain gating repository registration.
pub const REPO_DOMAIN: &str = "repo";

/// Built-in baseline for a policy domain. Unknown domains start empty.
pub fn builtin_default(domain: &str) -> PolicyDocument {
    match domain {
        REPO_DOMAIN => repo_default(),
        _ => PolicyDocument::new(),
    }
}

fn repo_default() -> PolicyDocument {
    let mut doc = PolicyDocument::new();
    doc.insert("enabled".to_string(), PolicyValue::Bool(true));
    doc.insert("allowInsecure".to_string(), PolicyValue::Bool(false));
    doc.insert("allowlist".to_string(), PolicyValue::Sequence(Vec::new()));
    doc.insert("denylist".to_string(), PolicyValue::Sequence(Vec::new()));
    doc
}
