use async_trait::async_trait;
use novea_interfaces::{InstallError, InstallerKind, PackageInstaller};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// An install request as written to the spool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRequest {
    pub kind: InstallerKind,
    pub reference: String,
    pub requested_at: String,
}

/// Hands install requests to the host installer by dropping one JSON file
/// per request into a spool directory.
pub struct SpoolInstaller {
    dir: PathBuf,
}

impl SpoolInstaller {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Pending requests, oldest first.
    pub async fn pending(&self) -> Result<Vec<InstallRequest>, InstallError> {
        if !fs::try_exists(&self.dir).await? {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let mut dir = fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut requests = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path).await?;
            requests.push(serde_json::from_str(&content)?);
        }
        Ok(requests)
    }
}

#[async_trait]
impl PackageInstaller for SpoolInstaller {
    async fn install(&self, kind: InstallerKind, reference: &str) -> Result<(), InstallError> {
        if reference.trim().is_empty() {
            return Err(InstallError::Rejected {
                reference: reference.to_string(),
                message: "empty reference".to_string(),
            });
        }

        fs::create_dir_all(&self.dir).await?;

        let now = chrono::Utc::now();
        let request = InstallRequest {
            kind,
            reference: reference.to_string(),
            requested_at: now.to_rfc3339(),
        };
        let file_name = format!(
            "{}-{}.json",
            now.timestamp_millis(),
            uuid::Uuid::new_v4().simple()
        );
        let path = self.dir.join(file_name);
        fs::write(&path, serde_json::to_string_pretty(&request)?).await?;

        tracing::info!("Queued {} install of {}", kind, reference);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_spools_request() {
        let temp_dir = tempfile::tempdir().unwrap();
        let installer = SpoolInstaller::new(temp_dir.path().join("spool"));

        assert!(installer.pending().await.unwrap().is_empty());

        installer
            .install(InstallerKind::Anura, "/proxy/https%3A%2F%2Fa%2Fx.zip")
            .await
            .unwrap();

        let pending = installer.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, InstallerKind::Anura);
        assert_eq!(pending[0].reference, "/proxy/https%3A%2F%2Fa%2Fx.zip");
    }

    #[tokio::test]
    async fn test_empty_reference_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let installer = SpoolInstaller::new(temp_dir.path());

        let result = installer.install(InstallerKind::Url, "  ").await;
        assert!(matches!(result, Err(InstallError::Rejected { .. })));
    }
}
