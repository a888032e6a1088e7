//! Disk-backed host collaborators: filesystem, settings and install spool.

pub mod disk_fs;
pub mod settings;
pub mod spool;

pub use disk_fs::DiskFileSystem;
pub use settings::JsonSettingsStore;
pub use spool::SpoolInstaller;
