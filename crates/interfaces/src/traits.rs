use crate::error::*;
use crate::types::*;
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

/// Virtual filesystem. Paths are absolute and `/`-separated.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// List a directory in listing order.
    async fn list(&self, path: &str) -> Result<Vec<DirEntry>, FsError>;

    async fn read_text(&self, path: &str) -> Result<String, FsError>;

    async fn write(&self, path: &str, content: &str) -> Result<(), FsError>;

    async fn exists(&self, path: &str) -> Result<bool, FsError>;

    /// Create a directory and any missing parents.
    async fn mkdir(&self, path: &str) -> Result<(), FsError>;
}

/// Synchronous key-value settings. Individual calls are atomic.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError>;

    fn set(&self, key: &str, value: Value) -> Result<(), SettingsError>;
}

/// Transient user-visible notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// GET `url` and return the body as text.
    async fn fetch_text(&self, url: &Url) -> Result<String, NetError>;
}

/// Rewrites a URL so it is fetched through the host's egress proxy.
pub trait UrlEncoder: Send + Sync {
    fn encode(&self, url: &str) -> String;
}

/// Host process table.
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    async fn spawn(&self, payload: Payload, options: SpawnOptions) -> Result<Pid, SpawnError>;

    async fn kill(&self, pid: Pid) -> Result<(), SpawnError>;

    /// Record that `window` belongs to `pid`.
    async fn associate_window(&self, pid: Pid, window: WindowId) -> Result<(), SpawnError>;
}

#[async_trait]
pub trait WindowManager: Send + Sync {
    async fn create(&self, spec: WindowSpec) -> Result<WindowId, WindowError>;

    /// Register an observer that fires once when `window` closes.
    fn on_close(&self, window: WindowId, observer: CloseObserver) -> Result<(), WindowError>;
}

/// Host package installer; places a package on the virtual filesystem.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    async fn install(&self, kind: InstallerKind, reference: &str) -> Result<(), InstallError>;
}

/// Turns source text into a loaded module through a short-lived blob handle.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    fn create_blob(&self, source: String, mime: &str) -> BlobUrl;

    fn revoke(&self, blob: &BlobUrl);

    async fn load(&self, blob: &BlobUrl) -> Result<LoadedModule, ModuleError>;
}

/// Native work run inside a supervised process.
#[async_trait]
pub trait Program: Send {
    fn name(&self) -> &str;

    async fn run(self: Box<Self>, ctx: ProcessContext) -> Result<(), ProgramError>;
}
