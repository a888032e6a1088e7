use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const CONFIG_ENV: &str = "NOVEA_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "novea.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Host directory backing the virtual filesystem.
    pub root_dir: PathBuf,
    /// Origin the shell is served from.
    pub origin: String,
    /// Prefix prepended to percent-encoded URLs for the egress proxy.
    pub proxy_prefix: String,
    pub settings_file: PathBuf,
    pub spool_dir: PathBuf,
    pub log_level: String,
    pub fetch_timeout_secs: u64,
    /// Re-check the repository policy when installing, not only when a
    /// repository is registered.
    pub enforce_policy_on_install: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./data/root"),
            origin: "http://localhost:8080/".to_string(),
            proxy_prefix: "/service/".to_string(),
            settings_file: PathBuf::from("./data/settings.json"),
            spool_dir: PathBuf::from("./data/spool"),
            log_level: "info".to_string(),
            fetch_timeout_secs: 30,
            enforce_policy_on_install: false,
        }
    }
}

impl ShellConfig {
    /// Load from `path`, else `$NOVEA_CONFIG`, else `novea.yaml`.
    ///
    /// An explicitly named file must exist; a missing default file yields
    /// the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let config = match explicit {
            Some(path) => Self::read(&path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::read(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document is all defaults.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.origin_url()?;

        for (name, path) in [
            ("root_dir", &self.root_dir),
            ("settings_file", &self.settings_file),
            ("spool_dir", &self.spool_dir),
        ] {
            if path.as_os_str().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
        }

        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("fetch_timeout_secs must be positive");
        }
        Ok(())
    }

    /// The origin as a base URL. A trailing slash is added so app paths are
    /// joined beneath it rather than replacing its last segment.
    pub fn origin_url(&self) -> Result<Url> {
        let mut origin = self.origin.trim().to_string();
        if !origin.ends_with('/') {
            origin.push('/');
        }
        let url = Url::parse(&origin).with_context(|| format!("Invalid origin {}", self.origin))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("Origin {} cannot be used as a base URL", self.origin);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ShellConfig::from_yaml("origin: https://novea.example\nlog_level: debug\n")
            .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.proxy_prefix, "/service/");
        assert!(!config.enforce_policy_on_install);
        assert_eq!(
            config.origin_url().unwrap().as_str(),
            "https://novea.example/"
        );
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ShellConfig::from_yaml("").unwrap(), ShellConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_origin() {
        let config = ShellConfig {
            origin: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ShellConfig {
            origin: "mailto:ops@example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let config = ShellConfig {
            spool_dir: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
