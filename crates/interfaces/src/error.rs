use crate::types::{Pid, WindowId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("Path not found: {0}")]
    NotFound(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum NetError {
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("HTTP client could not be built: {0}")]
    Client(String),
}

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("No such process: {0}")]
    NoSuchProcess(Pid),
    #[error("Spawn rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("No such window: {0}")]
    NotFound(WindowId),
    #[error("Window creation failed: {0}")]
    CreationFailed(String),
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Installer rejected {reference}: {message}")]
    Rejected { reference: String, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Unknown or revoked blob: {0}")]
    UnknownBlob(String),
    #[error("Module evaluation failed: {0}")]
    Evaluation(String),
}

/// Failure of a native program running inside a supervised process.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("Window error: {0}")]
    Window(#[from] WindowError),
    #[error("Process error: {0}")]
    Spawn(#[from] SpawnError),
}
