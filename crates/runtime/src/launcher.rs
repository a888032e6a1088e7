use crate::bootstrap::WindowBootstrap;
use crate::error::RuntimeError;
use crate::manifest::PackageManifest;
use crate::module::{BlobGuard, JS_MIME};
use novea_interfaces::{
    FileSystem, HttpFetch, LoadedModule, ModuleLoader, PackageType, Payload, Pid,
    ProcessSpawner, SpawnOptions, UrlEncoder, WindowManager, WindowSpec,
};
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

pub const DEFAULT_ICON: &str = "/assets/logo.svg";
pub const APPS_ROOT: &str = "/usr/apps";
pub const LIBS_ROOT: &str = "/usr/libs";

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Origin the shell is served from; app files live under `<origin>/fs/`.
    pub origin: Url,
    pub default_icon: String,
}

impl RuntimeConfig {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            default_icon: DEFAULT_ICON.to_string(),
        }
    }
}

/// Host services the runtime launches packages through.
#[derive(Clone)]
pub struct HostCapabilities {
    pub fs: Arc<dyn FileSystem>,
    pub fetch: Arc<dyn HttpFetch>,
    pub encoder: Arc<dyn UrlEncoder>,
    pub spawner: Arc<dyn ProcessSpawner>,
    pub windows: Arc<dyn WindowManager>,
    pub modules: Arc<dyn ModuleLoader>,
}

pub struct Runtime {
    config: RuntimeConfig,
    host: HostCapabilities,
}

impl Runtime {
    pub fn new(config: RuntimeConfig, host: HostCapabilities) -> Self {
        Self { config, host }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub(crate) fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.host.fs
    }

    /// Launch a package. `caller` is the process that asked for the launch;
    /// it is killed when the package's window closes.
    pub async fn exec(
        &self,
        manifest: &PackageManifest,
        args: &[(String, String)],
        caller: Option<Pid>,
    ) -> Result<Pid, RuntimeError> {
        manifest.validate().map_err(RuntimeError::InvalidManifest)?;

        let window = manifest.window_settings();
        let url = self.source_url(manifest, args)?;
        let icon = self.icon_url(manifest)?;

        let payload = match manifest.kind {
            PackageType::App | PackageType::Webview => {
                let spec = WindowSpec {
                    title: manifest.display_title().to_string(),
                    icon,
                    url,
                    width: window.width,
                    height: window.height,
                    resizable: window.resizable,
                    file_picker: window.file_picker,
                };
                Payload::Program(Box::new(WindowBootstrap::new(
                    spec,
                    caller,
                    self.host.windows.clone(),
                    self.host.spawner.clone(),
                )))
            }
            PackageType::Process => {
                let source_url =
                    Url::parse(&url).map_err(|e| RuntimeError::InvalidUrl(format!("{}: {}", url, e)))?;
                debug!("Fetching process source {}", source_url);
                Payload::Script(self.host.fetch.fetch_text(&source_url).await?)
            }
            PackageType::Lib => {
                return Err(RuntimeError::NotExecutable {
                    id: manifest.id.clone(),
                    kind: manifest.kind,
                })
            }
        };

        let pid = self
            .host
            .spawner
            .spawn(payload, SpawnOptions::direct())
            .await?;
        info!("Launched {} ({}) as process {}", manifest.id, manifest.kind, pid);
        Ok(pid)
    }

    /// Load a library package as a module.
    pub async fn import(&self, manifest: &PackageManifest) -> Result<LoadedModule, RuntimeError> {
        let result = self.load_library(manifest).await;
        if let Err(e) = &result {
            error!("Error importing library {}: {}", manifest.id, e);
        }
        result
    }

    async fn load_library(&self, manifest: &PackageManifest) -> Result<LoadedModule, RuntimeError> {
        manifest.validate().map_err(RuntimeError::InvalidManifest)?;

        let path = format!(
            "{}/{}/{}",
            LIBS_ROOT,
            manifest.id,
            manifest.source.trim_start_matches("./")
        );
        let source = self.host.fs.read_text(&path).await?;

        let blob = BlobGuard::new(self.host.modules.as_ref(), source, JS_MIME);
        let module = self.host.modules.load(blob.url()).await?;
        debug!("Imported {} from {}", manifest.id, path);
        Ok(module)
    }

    fn app_root(&self, id: &str) -> Result<Url, RuntimeError> {
        let path = format!("fs{}/{}/", APPS_ROOT, id);
        self.config
            .origin
            .join(&path)
            .map_err(|e| RuntimeError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn source_url(
        &self,
        manifest: &PackageManifest,
        args: &[(String, String)],
    ) -> Result<String, RuntimeError> {
        if manifest.kind == PackageType::Webview {
            return Ok(self.host.encoder.encode(&manifest.source));
        }

        let mut url = self
            .app_root(&manifest.id)?
            .join(&manifest.source)
            .map_err(|e| RuntimeError::InvalidUrl(format!("{}: {}", manifest.source, e)))?;
        if !args.is_empty() {
            url.query_pairs_mut().extend_pairs(args);
        }
        Ok(url.to_string())
    }

    fn icon_url(&self, manifest: &PackageManifest) -> Result<String, RuntimeError> {
        match manifest.icon.as_deref() {
            Some(icon) if !icon.is_empty() => {
                let url = self
                    .app_root(&manifest.id)?
                    .join(icon)
                    .map_err(|e| RuntimeError::InvalidUrl(format!("{}: {}", icon, e)))?;
                Ok(url.to_string())
            }
            _ => Ok(self.config.default_icon.clone()),
        }
    }
}
