use novea_interfaces::{InstallError, NetError, SettingsError};
use novea_policy::PolicyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Repository {0} already exists")]
    Duplicate(String),
    #[error("Repository {0} not found")]
    NotFound(String),
    #[error("Package with id/name {id} not found in repository {repo}")]
    PackageNotFound { id: String, repo: String },
    #[error("Invalid repository URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Network(#[from] NetError),
    #[error("Malformed repository document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Install failed: {0}")]
    Install(#[from] InstallError),
}
