//! Software repositories: the registry of known repositories and the
//! resolver that turns `(repository, package)` into an install reference.

pub mod error;
pub mod registry;
pub mod resolver;
pub mod types;

pub use error::RepoError;
pub use registry::{builtin_repos, RepoStore, REPOS_KEY};
pub use resolver::RepoResolver;
pub use types::*;
