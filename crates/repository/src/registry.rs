use crate::error::RepoError;
use crate::types::{AddOutcome, ProtocolType, RepoEntry};
use novea_interfaces::{Notification, Notifier, SettingsStore};
use novea_policy::{PolicyEngine, PolicyVerdict};
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Settings key holding the repository list.
pub const REPOS_KEY: &str = "repos";

pub fn builtin_repos() -> Vec<RepoEntry> {
    vec![
        RepoEntry::new("https://repos.xen-os.dev/apps/", ProtocolType::Xen),
        RepoEntry::new("https://repos.xen-os.dev/webapps/", ProtocolType::Xen),
        RepoEntry::new("https://repos.xen-os.dev/games/", ProtocolType::Xen),
        RepoEntry::new("https://games.anura.pro", ProtocolType::Anura),
    ]
}

pub(crate) fn blocked_notification(url: &str) -> Notification {
    Notification {
        title: "NoveaOS".to_string(),
        description: format!("The repo URL {} is blocked by your policies", url),
        icon: "/assets/logo.svg".to_string(),
        timeout_ms: 2500,
    }
}

pub(crate) fn parse_url(url: &str) -> Result<Url, RepoError> {
    Url::parse(url).map_err(|source| RepoError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Registry of known repositories, persisted under [`REPOS_KEY`].
///
/// Every mutation re-reads the persisted list and writes it back while
/// holding `write_gate`, so concurrent updates through one store are never
/// lost.
pub struct RepoStore {
    settings: Arc<dyn SettingsStore>,
    policies: Arc<PolicyEngine>,
    notifier: Arc<dyn Notifier>,
    write_gate: Mutex<()>,
}

impl RepoStore {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        policies: Arc<PolicyEngine>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            policies,
            notifier,
            write_gate: Mutex::new(()),
        }
    }

    /// Merge the built-in repositories into the persisted list.
    ///
    /// Safe to run on every boot: existing entries are kept and a built-in
    /// whose url is already present is never added twice.
    pub async fn init(&self) -> Result<Vec<RepoEntry>, RepoError> {
        let _gate = self.write_gate.lock().await;
        let mut repos = self.load()?;

        for builtin in builtin_repos() {
            if !repos.iter().any(|repo| repo.url == builtin.url) {
                tracing::debug!("Adding built-in repository {}", builtin.url);
                repos.push(builtin);
            }
        }

        self.store(&repos)?;
        tracing::info!("Repository registry ready with {} entries", repos.len());
        Ok(repos)
    }

    pub fn list(&self) -> Result<Vec<RepoEntry>, RepoError> {
        self.load()
    }

    /// Register a repository.
    ///
    /// A policy block is not an error: the user is notified and
    /// [`AddOutcome::Blocked`] is returned with nothing persisted.
    pub async fn add_repo(
        &self,
        url: &str,
        protocol: ProtocolType,
    ) -> Result<AddOutcome, RepoError> {
        let parsed = parse_url(url)?;
        let policy = self.policies.repo_policy().await?;

        if let PolicyVerdict::Denied(reason) = policy.check(&parsed) {
            tracing::warn!("Repository {} blocked by policy: {}", url, reason);
            self.notifier.notify(blocked_notification(url)).await;
            return Ok(AddOutcome::Blocked(reason));
        }

        let _gate = self.write_gate.lock().await;
        let mut repos = self.load()?;

        if repos.iter().any(|repo| repo.url == url) {
            return Err(RepoError::Duplicate(url.to_string()));
        }

        repos.push(RepoEntry::new(url, protocol));
        self.store(&repos)?;

        tracing::info!("Added {} repository {}", protocol, url);
        Ok(AddOutcome::Added)
    }

    pub async fn remove_repo(&self, url: &str) -> Result<(), RepoError> {
        let _gate = self.write_gate.lock().await;
        let mut repos = self.load()?;

        let index = repos
            .iter()
            .position(|repo| repo.url == url)
            .ok_or_else(|| RepoError::NotFound(url.to_string()))?;

        repos.remove(index);
        self.store(&repos)?;

        tracing::info!("Removed repository {}", url);
        Ok(())
    }

    fn load(&self) -> Result<Vec<RepoEntry>, RepoError> {
        match self.settings.get(REPOS_KEY)? {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    fn store(&self, repos: &[RepoEntry]) -> Result<(), RepoError> {
        self.settings.set(REPOS_KEY, serde_json::to_value(repos)?)?;
        Ok(())
    }
}
