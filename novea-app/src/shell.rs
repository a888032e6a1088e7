use crate::config::ShellConfig;
use anyhow::{Context, Result};
use novea_desktop::WindowTable;
use novea_interfaces::{HttpFetch, Notifier, TerminalNotifier};
use novea_net::{ProxyEncoder, ReqwestFetcher};
use novea_policy::PolicyEngine;
use novea_process::ProcessTable;
use novea_repository::{ProtocolType, RepoResolver, RepoStore};
use novea_runtime::{
    BlobModuleLoader, HostCapabilities, InstalledPackages, Runtime, RuntimeConfig,
};
use novea_storage::{DiskFileSystem, JsonSettingsStore, SpoolInstaller};
use std::sync::Arc;
use std::time::Duration;

/// Every shell service, wired together once at startup.
pub struct Shell {
    pub config: ShellConfig,
    pub fs: Arc<DiskFileSystem>,
    pub settings: Arc<JsonSettingsStore>,
    pub installer: Arc<SpoolInstaller>,
    pub processes: Arc<ProcessTable>,
    pub windows: Arc<WindowTable>,
    pub policies: Arc<PolicyEngine>,
    pub repos: RepoStore,
    pub resolver: RepoResolver,
    pub packages: InstalledPackages,
}

impl Shell {
    pub fn open(config: ShellConfig) -> Result<Self> {
        let fetch = Arc::new(
            ReqwestFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
                .context("Failed to build the HTTP client")?,
        );
        Self::with_fetcher(config, fetch)
    }

    /// Build the shell around a caller-supplied network client.
    pub fn with_fetcher(config: ShellConfig, fetch: Arc<dyn HttpFetch>) -> Result<Self> {
        config.validate()?;

        std::fs::create_dir_all(&config.root_dir)
            .with_context(|| format!("Failed to create {}", config.root_dir.display()))?;

        let fs = Arc::new(DiskFileSystem::new(&config.root_dir));
        let settings = Arc::new(
            JsonSettingsStore::open(&config.settings_file)
                .with_context(|| format!("Failed to open {}", config.settings_file.display()))?,
        );
        let installer = Arc::new(SpoolInstaller::new(&config.spool_dir));
        let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier::new());
        let encoder = Arc::new(ProxyEncoder::new(config.proxy_prefix.clone()));
        let processes = Arc::new(ProcessTable::new());
        let windows = Arc::new(WindowTable::new());
        let policies = Arc::new(PolicyEngine::new(fs.clone()));

        let repos = RepoStore::new(settings.clone(), policies.clone(), notifier.clone());
        let resolver = RepoResolver::new(
            fetch.clone(),
            encoder.clone(),
            installer.clone(),
            policies.clone(),
            notifier,
        )
        .enforce_on_install(config.enforce_policy_on_install);

        let runtime = Runtime::new(
            RuntimeConfig::new(config.origin_url()?),
            HostCapabilities {
                fs: fs.clone(),
                fetch,
                encoder,
                spawner: processes.clone(),
                windows: windows.clone(),
                modules: Arc::new(BlobModuleLoader::new()),
            },
        );

        tracing::debug!("Shell rooted at {}", config.root_dir.display());

        Ok(Self {
            config,
            fs,
            settings,
            installer,
            processes,
            windows,
            policies,
            repos,
            resolver,
            packages: InstalledPackages::new(Arc::new(runtime)),
        })
    }

    /// Protocol to speak to `repo_url`: `explicit` when given, else the
    /// type the repository was registered with.
    pub fn protocol_for(
        &self,
        repo_url: &str,
        explicit: Option<ProtocolType>,
    ) -> Result<ProtocolType> {
        if let Some(protocol) = explicit {
            return Ok(protocol);
        }

        self.repos
            .list()?
            .into_iter()
            .find(|entry| entry.url == repo_url)
            .map(|entry| entry.protocol)
            .with_context(|| {
                format!(
                    "Repository {} is not registered; pass --type to name its protocol",
                    repo_url
                )
            })
    }
}
