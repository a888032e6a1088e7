//! Execution runtime: turns an installed package's manifest into a running
//! window, headless process or imported library.

pub mod bootstrap;
pub mod error;
pub mod installed;
pub mod launcher;
pub mod manifest;
pub mod module;

pub use bootstrap::WindowBootstrap;
pub use error::RuntimeError;
pub use installed::InstalledPackages;
pub use launcher::{
    HostCapabilities, Runtime, RuntimeConfig, APPS_ROOT, DEFAULT_ICON, LIBS_ROOT,
};
pub use manifest::{PackageManifest, WindowConfig, WindowSettings};
pub use module::{BlobGuard, BlobModuleLoader, JS_MIME};
