use crate::error::RuntimeError;
use crate::launcher::{Runtime, APPS_ROOT, LIBS_ROOT};
use crate::manifest::PackageManifest;
use novea_interfaces::{FsError, LoadedModule, PackageType, Pid};
use std::sync::Arc;
use tracing::{debug, info};

/// Packages already placed on the filesystem by the installer.
pub struct InstalledPackages {
    runtime: Arc<Runtime>,
}

impl InstalledPackages {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Read a package manifest, looking in the apps root before the libs root.
    pub async fn manifest(&self, id: &str) -> Result<PackageManifest, RuntimeError> {
        if id.is_empty() || id.contains('/') || id.contains("..") {
            return Err(RuntimeError::InvalidManifest(format!(
                "invalid package id: {:?}",
                id
            )));
        }

        let fs = self.runtime.fs();
        for root in [APPS_ROOT, LIBS_ROOT] {
            let path = format!("{}/{}/manifest.json", root, id);
            match fs.read_text(&path).await {
                Ok(text) => {
                    debug!("Read manifest {}", path);
                    return Ok(serde_json::from_str(&text)?);
                }
                Err(FsError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(RuntimeError::NotInstalled(id.to_string()))
    }

    /// Ids of installed apps in listing order. A missing apps root is empty.
    pub async fn list(&self) -> Result<Vec<String>, RuntimeError> {
        let fs = self.runtime.fs();
        if !fs.exists(APPS_ROOT).await? {
            return Ok(Vec::new());
        }

        Ok(fs
            .list(APPS_ROOT)
            .await?
            .into_iter()
            .filter(|entry| !entry.is_file)
            .map(|entry| entry.name)
            .collect())
    }

    pub async fn open(
        &self,
        id: &str,
        args: &[(String, String)],
        caller: Option<Pid>,
    ) -> Result<Pid, RuntimeError> {
        let manifest = self.manifest(id).await?;
        if manifest.kind == PackageType::Lib {
            return Err(RuntimeError::NotExecutable {
                id: manifest.id,
                kind: manifest.kind,
            });
        }

        info!("Opening {}", id);
        self.runtime.exec(&manifest, args, caller).await
    }

    pub async fn import(&self, id: &str) -> Result<LoadedModule, RuntimeError> {
        let manifest = self.manifest(id).await?;
        self.runtime.import(&manifest).await
    }
}
