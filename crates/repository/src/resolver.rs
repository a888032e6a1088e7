use crate::error::RepoError;
use crate::registry::{blocked_notification, parse_url};
use crate::types::{
    ArtifactRef, InstallOutcome, MatchKey, PackageList, PackageListing, ProtocolType,
    RemotePackageManifest, RepoManifest,
};
use novea_interfaces::{HttpFetch, InstallerKind, Notifier, PackageInstaller, UrlEncoder};
use novea_policy::{PolicyEngine, PolicyVerdict};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Fetches repository documents and resolves packages to install references
/// across the xen/novea and anura layouts.
pub struct RepoResolver {
    fetch: Arc<dyn HttpFetch>,
    encoder: Arc<dyn UrlEncoder>,
    installer: Arc<dyn PackageInstaller>,
    policies: Arc<PolicyEngine>,
    notifier: Arc<dyn Notifier>,
    enforce_on_install: bool,
}

impl RepoResolver {
    pub fn new(
        fetch: Arc<dyn HttpFetch>,
        encoder: Arc<dyn UrlEncoder>,
        installer: Arc<dyn PackageInstaller>,
        policies: Arc<PolicyEngine>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            fetch,
            encoder,
            installer,
            policies,
            notifier,
            enforce_on_install: false,
        }
    }

    /// Re-check the repository policy before every install.
    pub fn enforce_on_install(mut self, enabled: bool) -> Self {
        self.enforce_on_install = enabled;
        self
    }

    pub async fn get_manifest(&self, repo_url: &str) -> Result<RepoManifest, RepoError> {
        let url = join(repo_url, "manifest.json")?;
        self.fetch_json(&url).await
    }

    pub async fn list_packages(
        &self,
        repo_url: &str,
        protocol: ProtocolType,
    ) -> Result<PackageList, RepoError> {
        if protocol.is_manifest_style() {
            let manifest = self.get_manifest(repo_url).await?;
            return Ok(PackageList::Ids(manifest.packages));
        }

        Ok(PackageList::Listing(self.get_listing(repo_url).await?))
    }

    pub async fn get_package(
        &self,
        repo_url: &str,
        id: &str,
    ) -> Result<RemotePackageManifest, RepoError> {
        let url = join(repo_url, &format!("packages/{}/manifest.json", id))?;
        self.fetch_json(&url).await
    }

    /// Resolve `id` and hand the artifact to the host installer.
    ///
    /// Registration is the policy gate. The policy is read again here only
    /// when the resolver was built with [`RepoResolver::enforce_on_install`].
    pub async fn install(
        &self,
        repo_url: &str,
        id: &str,
        protocol: ProtocolType,
        match_key: Option<MatchKey>,
    ) -> Result<InstallOutcome, RepoError> {
        if self.enforce_on_install {
            let policy = self.policies.repo_policy().await?;
            if let PolicyVerdict::Denied(reason) = policy.check(&parse_url(repo_url)?) {
                tracing::warn!("Install of {} from {} blocked: {}", id, repo_url, reason);
                self.notifier.notify(blocked_notification(repo_url)).await;
                return Ok(InstallOutcome::Blocked(reason));
            }
        }

        let artifact = self
            .resolve_artifact(repo_url, id, protocol, match_key.unwrap_or_default())
            .await?;

        tracing::info!("Installing {} from {}", id, artifact.url);
        self.installer
            .install(artifact.kind, &artifact.encoded)
            .await?;

        Ok(InstallOutcome::Installed(artifact))
    }

    pub async fn resolve_artifact(
        &self,
        repo_url: &str,
        id: &str,
        protocol: ProtocolType,
        match_key: MatchKey,
    ) -> Result<ArtifactRef, RepoError> {
        let (url, kind) = if protocol.is_manifest_style() {
            let url = join(repo_url, &format!("packages/{}/package.zip", id))?;
            (url, InstallerKind::Url)
        } else {
            let listing = self.get_listing(repo_url).await?;
            let entry = listing
                .find(match_key, id)
                .ok_or_else(|| RepoError::PackageNotFound {
                    id: id.to_string(),
                    repo: repo_url.to_string(),
                })?;
            (join(repo_url, &entry.data)?, InstallerKind::Anura)
        };

        let encoded = self.encoder.encode(url.as_str());
        Ok(ArtifactRef { url, encoded, kind })
    }

    async fn get_listing(&self, repo_url: &str) -> Result<PackageListing, RepoError> {
        let url = join(repo_url, "list.json")?;
        self.fetch_json(&url).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, RepoError> {
        tracing::debug!("Fetching {}", url);
        let body = self.fetch.fetch_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Resolve `path` against a repository base URL.
fn join(repo_url: &str, path: &str) -> Result<Url, RepoError> {
    parse_url(repo_url)?
        .join(path)
        .map_err(|source| RepoError::InvalidUrl {
            url: format!("{} + {}", repo_url, path),
            source,
        })
}
