pub mod defaults;
pub mod engine;
pub mod merge;
pub mod repo_rules;
pub mod value;

pub use defaults::{builtin_default, REPO_DOMAIN};
pub use engine::{PolicyEngine, PolicyError, DEFAULT_POLICY_FILE, DEFAULT_POLICY_ROOT};
pub use merge::merge_policies;
pub use repo_rules::{PolicyVerdict, RepoPolicy};
pub use value::{PolicyDocument, PolicyValue};
