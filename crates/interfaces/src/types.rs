use crate::traits::Program;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a window owned by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    App,
    Process,
    Webview,
    Lib,
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageType::App => "app",
            PackageType::Process => "process",
            PackageType::Webview => "webview",
            PackageType::Lib => "lib",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_file: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub timeout_ms: u64,
}

/// Everything the window manager needs to open a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSpec {
    pub title: String,
    pub icon: String,
    pub url: String,
    pub width: String,
    pub height: String,
    pub resizable: bool,
    pub file_picker: bool,
}

/// Installer kind handed to the host package installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallerKind {
    /// Zip package laid out the xen/novea way.
    Url,
    /// Package taken from an anura flat listing.
    Anura,
}

impl fmt::Display for InstallerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallerKind::Url => f.write_str("url"),
            InstallerKind::Anura => f.write_str("anura"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpawnKind {
    /// Payload is interpreted directly, without a module wrapper.
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpawnOptions {
    pub asynchronous: bool,
    pub kind: SpawnKind,
}

impl SpawnOptions {
    pub fn direct() -> Self {
        Self {
            asynchronous: true,
            kind: SpawnKind::Direct,
        }
    }
}

/// Unit of work submitted to the process spawner.
pub enum Payload {
    /// Executable text, passed through verbatim.
    Script(String),
    /// Native program run by the host on behalf of the new process.
    Program(Box<dyn Program>),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Script(source) => f
                .debug_struct("Script")
                .field("len", &source.len())
                .finish(),
            Payload::Program(program) => f
                .debug_struct("Program")
                .field("name", &program.name())
                .finish(),
        }
    }
}

/// Identity handed to a program when its process starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessContext {
    pub pid: Pid,
}

/// Callback fired once when a window closes.
pub type CloseObserver = Box<dyn FnOnce(WindowId) + Send + 'static>;

/// Handle to source registered with a module loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(pub String);

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub specifier: String,
    pub source: String,
    pub exports: Vec<String>,
}
