use novea_interfaces::{FsError, ModuleError, NetError, PackageType, SpawnError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Network(#[from] NetError),
    #[error("Filesystem error: {0}")]
    Fs(#[from] FsError),
    #[error("Spawn failed: {0}")]
    Spawn(#[from] SpawnError),
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),
    #[error("Malformed package manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid package manifest: {0}")]
    InvalidManifest(String),
    #[error("Package {id} of type {kind} cannot be executed")]
    NotExecutable { id: String, kind: PackageType },
    #[error("Package {0} is not installed")]
    NotInstalled(String),
}
