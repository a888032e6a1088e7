use novea_interfaces::{InstallerKind, Maintainer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Repository wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolType {
    /// Root `manifest.json` listing package ids; packages under `packages/<id>/`.
    Xen,
    /// Flat `list.json` with `apps` and `libs`.
    Anura,
    /// Same layout as `Xen`.
    Novea,
}

impl ProtocolType {
    pub fn is_manifest_style(self) -> bool {
        matches!(self, ProtocolType::Xen | ProtocolType::Novea)
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolType::Xen => "xen",
            ProtocolType::Anura => "anura",
            ProtocolType::Novea => "novea",
        };
        f.write_str(name)
    }
}

impl FromStr for ProtocolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xen" => Ok(ProtocolType::Xen),
            "anura" => Ok(ProtocolType::Anura),
            "novea" => Ok(ProtocolType::Novea),
            other => Err(format!("unknown repository type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub url: String,
    #[serde(rename = "type")]
    pub protocol: ProtocolType,
}

impl RepoEntry {
    pub fn new(url: impl Into<String>, protocol: ProtocolType) -> Self {
        Self {
            url: url.into(),
            protocol,
        }
    }
}

/// Root `manifest.json` of a xen/novea repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoManifest {
    pub title: String,
    pub description: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<Maintainer>,
    #[serde(default)]
    pub packages: Vec<String>,
}

/// `packages/<id>/manifest.json` of a xen/novea repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePackageManifest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<Maintainer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub package: String,
    pub name: String,
    pub data: String,
}

/// `list.json` of an anura repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageListing {
    #[serde(default)]
    pub apps: Vec<ListingEntry>,
    #[serde(default)]
    pub libs: Vec<ListingEntry>,
}

impl PackageListing {
    /// First entry matching `ident`, searching apps before libs.
    pub fn find(&self, key: MatchKey, ident: &str) -> Option<&ListingEntry> {
        self.apps.iter().chain(self.libs.iter()).find(|entry| match key {
            MatchKey::Id => entry.package == ident,
            MatchKey::Name => entry.name == ident,
        })
    }
}

/// Which field of a listing entry an identifier is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchKey {
    #[default]
    Id,
    Name,
}

impl FromStr for MatchKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(MatchKey::Id),
            "name" => Ok(MatchKey::Name),
            other => Err(format!("unknown match key: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageList {
    Ids(Vec<String>),
    Listing(PackageListing),
}

/// Resolved location of an installable package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub url: Url,
    /// `url` after the network encoder; this is what the installer receives.
    pub encoded: String,
    pub kind: InstallerKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Blocked(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(ArtifactRef),
    Blocked(String),
}
