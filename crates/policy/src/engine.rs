use crate::defaults::{builtin_default, REPO_DOMAIN};
use crate::merge::merge_policies;
use crate::repo_rules::RepoPolicy;
use crate::value::{PolicyDocument, PolicyValue};
use novea_interfaces::{FileSystem, FsError};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_POLICY_ROOT: &str = "/usr/policies";
pub const DEFAULT_POLICY_FILE: &str = "default.json";

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Invalid policy name: {0}")]
    InvalidName(String),
    #[error("Malformed policy document {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Policy document {0} is not a mapping")]
    NotAMapping(String),
    #[error("Filesystem error: {0}")]
    Fs(#[from] FsError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Loads, layers and persists policy documents, one directory per domain.
pub struct PolicyEngine {
    fs: Arc<dyn FileSystem>,
    root: String,
}

impl PolicyEngine {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_root(fs, DEFAULT_POLICY_ROOT)
    }

    pub fn with_root(fs: Arc<dyn FileSystem>, root: impl Into<String>) -> Self {
        let root = root.into();
        let root = root.trim_end_matches('/').to_string();
        Self { fs, root }
    }

    /// Effective policy for `domain`.
    ///
    /// A domain seen for the first time gets its directory and a
    /// `default.json` holding the built-in default. The built-in default is
    /// always merged beneath the on-disk documents, so a damaged or deleted
    /// default file never drops the baseline.
    pub async fn get_policy(&self, domain: &str) -> Result<PolicyDocument, PolicyError> {
        let folder = self.domain_dir(domain)?;

        if !self.fs.exists(&folder).await? {
            tracing::info!("Creating policy domain {} with built-in default", domain);
            self.fs.mkdir(&folder).await?;
            self.set_policy(domain, DEFAULT_POLICY_FILE, &builtin_default(domain))
                .await?;
        }

        let documents = self.read_policies(&folder).await?;
        let merged = merge_policies(documents);

        Ok(merge_policies([builtin_default(domain), merged]))
    }

    /// Write `content` as `<domain>/<file>`. Callers re-read with
    /// [`PolicyEngine::get_policy`] to see the effect.
    pub async fn set_policy(
        &self,
        domain: &str,
        file: &str,
        content: &PolicyDocument,
    ) -> Result<(), PolicyError> {
        let folder = self.domain_dir(domain)?;
        validate_file_name(file)?;

        if !self.fs.exists(&folder).await? {
            self.fs.mkdir(&folder).await?;
        }

        let path = format!("{}/{}", folder, file);
        let body = serde_json::to_string_pretty(content)?;
        self.fs.write(&path, &body).await?;

        tracing::debug!("Wrote policy document {}", path);
        Ok(())
    }

    pub async fn repo_policy(&self) -> Result<RepoPolicy, PolicyError> {
        let doc = self.get_policy(REPO_DOMAIN).await?;
        Ok(RepoPolicy::from_document(&doc))
    }

    async fn read_policies(&self, folder: &str) -> Result<Vec<PolicyDocument>, PolicyError> {
        let mut policies = Vec::new();

        for entry in self.fs.list(folder).await? {
            if !entry.is_file || !entry.name.ends_with(".json") {
                continue;
            }

            let path = format!("{}/{}", folder, entry.name);
            let content = self.fs.read_text(&path).await?;
            let value: PolicyValue = serde_json::from_str(&content).map_err(|source| {
                PolicyError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;

            match value {
                PolicyValue::Mapping(doc) => policies.push(doc),
                _ => return Err(PolicyError::NotAMapping(path)),
            }
        }

        Ok(policies)
    }

    fn domain_dir(&self, domain: &str) -> Result<String, PolicyError> {
        if domain.is_empty() || domain.contains('/') || domain.contains("..") {
            return Err(PolicyError::InvalidName(domain.to_string()));
        }
        Ok(format!("{}/{}", self.root, domain))
    }
}

fn validate_file_name(file: &str) -> Result<(), PolicyError> {
    if file.contains('/') || file.contains("..") || !file.ends_with(".json") || file == ".json" {
        return Err(PolicyError::InvalidName(file.to_string()));
    }
    Ok(())
}
