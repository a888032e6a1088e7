//! Typed view of the `repo` policy domain.

use crate::value::{PolicyDocument, PolicyValue};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyVerdict {
    Allowed,
    Denied(String),
}

impl PolicyVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyVerdict::Allowed)
    }
}

/// Rules applied to repository URLs.
///
/// List entries take three forms: a URL prefix (anything containing
/// `://`), a wildcard domain (`*.example.com`, which also covers the bare
/// domain) or an exact host name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPolicy {
    pub enabled: bool,
    pub allow_insecure: bool,
    pub allowlist: Vec<String>,
    pub denylist: Vec<String>,
}

impl RepoPolicy {
    pub fn from_document(doc: &PolicyDocument) -> Self {
        Self {
            enabled: flag(doc, "enabled", true),
            allow_insecure: flag(doc, "allowInsecure", false),
            allowlist: strings(doc, "allowlist"),
            denylist: strings(doc, "denylist"),
        }
    }

    pub fn check(&self, url: &Url) -> PolicyVerdict {
        if !self.enabled {
            return PolicyVerdict::Allowed;
        }

        match url.scheme() {
            "https" => {}
            "http" if self.allow_insecure => {}
            "http" => {
                return PolicyVerdict::Denied("insecure repository URLs are not allowed".to_string())
            }
            other => return PolicyVerdict::Denied(format!("unsupported scheme: {}", other)),
        }

        if let Some(pattern) = self.denylist.iter().find(|p| pattern_matches(p, url)) {
            return PolicyVerdict::Denied(format!("matches denylist entry {}", pattern));
        }

        if !self.allowlist.is_empty() && !self.allowlist.iter().any(|p| pattern_matches(p, url)) {
            return PolicyVerdict::Denied("not on the allowlist".to_string());
        }

        PolicyVerdict::Allowed
    }
}

fn flag(doc: &PolicyDocument, key: &str, default: bool) -> bool {
    doc.get(key).and_then(PolicyValue::as_bool).unwrap_or(default)
}

// Non-string entries are ignored.
fn strings(doc: &PolicyDocument, key: &str) -> Vec<String> {
    doc.get(key)
        .and_then(PolicyValue::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter_map(PolicyValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn pattern_matches(pattern: &str, url: &Url) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return false;
    }

    if pattern.contains("://") {
        return url.as_str().starts_with(pattern);
    }

    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(domain) => host == domain || host.ends_with(&format!(".{}", domain)),
        None => host == pattern,
    }
}
