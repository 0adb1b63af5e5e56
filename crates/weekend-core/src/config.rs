use crate::error::{Result, WeekendError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin used to build public asset URLs, without the `/files` suffix.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_port() -> u16 {
    3141
}

fn default_public_base_url() -> String {
    format!("http://localhost:{}", default_port())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            public_base_url: default_public_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: u64,
}

fn default_max_upload() -> u64 {
    crate::asset::MAX_FILE_SIZE
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            site: SiteConfig {
                name: site_name.into(),
                tagline: None,
            },
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(WeekendError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Base URL for files served out of the asset directory.
    pub fn files_base_url(&self) -> String {
        format!("{}/files", self.server.public_base_url.trim_end_matches('/'))
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.site.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "site.name is empty".to_string(),
            });
        }

        let url = &self.server.public_base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("server.public_base_url '{url}' is not an http(s) URL"),
            });
        }

        if self.storage.max_upload_bytes == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "storage.max_upload_bytes is 0; every upload will be rejected"
                    .to_string(),
            });
        } else if self.storage.max_upload_bytes > 100 * 1024 * 1024 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "storage.max_upload_bytes is {} (over 100 MiB)",
                    self.storage.max_upload_bytes
                ),
            });
        }

        warnings
    }
}
