use novea_interfaces::{Maintainer, PackageType};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_WIDTH: &str = "600px";
pub const DEFAULT_HEIGHT: &str = "400px";

/// Manifest of an installed package (`manifest.json` in its install root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: PackageType,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Path relative to the install root, or a remote URL for webviews.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<Maintainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default, deserialize_with = "dimension")]
    pub width: Option<String>,
    #[serde(default, deserialize_with = "dimension")]
    pub height: Option<String>,
    #[serde(default)]
    pub resizable: Option<bool>,
    #[serde(default, rename = "xenFilePicker")]
    pub xen_file_picker: Option<bool>,
}

/// Window parameters with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSettings {
    pub width: String,
    pub height: String,
    pub resizable: bool,
    pub file_picker: bool,
}

impl PackageManifest {
    pub fn window_settings(&self) -> WindowSettings {
        let config = self.window.clone().unwrap_or_default();
        WindowSettings {
            width: config.width.unwrap_or_else(|| DEFAULT_WIDTH.to_string()),
            height: config.height.unwrap_or_else(|| DEFAULT_HEIGHT.to_string()),
            resizable: config.resizable.unwrap_or(true),
            file_picker: config.xen_file_picker.unwrap_or(false),
        }
    }

    /// Window title: `title`, else `name`, else the package id.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ if !self.name.is_empty() => &self.name,
            _ => &self.id,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() || self.id.contains('/') || self.id.contains("..") {
            return Err(format!("invalid package id: {:?}", self.id));
        }
        if self.source.trim().is_empty() {
            return Err(format!("package {} has no source", self.id));
        }
        Ok(())
    }
}

// Accept `"800px"` as well as a bare number of pixels.
fn dimension<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Pixels(u32),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Pixels(px) => format!("{}px", px),
    }))
}
