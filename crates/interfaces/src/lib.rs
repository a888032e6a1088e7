//! Host capabilities consumed by the Novea package runtime.
//!
//! Every component receives the narrow capabilities it needs through its
//! constructor; nothing here reaches for shared global state.

pub mod error;
pub mod terminal;
pub mod traits;
pub mod types;

pub use error::{
    FsError, InstallError, ModuleError, NetError, ProgramError, SettingsError, SpawnError,
    WindowError,
};
pub use terminal::TerminalNotifier;
pub use traits::{
    FileSystem, HttpFetch, ModuleLoader, Notifier, PackageInstaller, ProcessSpawner, Program,
    SettingsStore, UrlEncoder, WindowManager,
};
pub use types::*;
