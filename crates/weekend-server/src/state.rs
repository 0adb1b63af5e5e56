use std::path::{Path, PathBuf};

use weekend_core::actions::Portfolio;
use weekend_core::config::{Config, SiteConfig};
use weekend_core::paths;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub portfolio: Portfolio,
    pub site: SiteConfig,
    /// Directory served under `/files`, when blobs live on local disk.
    pub files_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(portfolio: Portfolio, site: SiteConfig) -> Self {
        Self {
            portfolio,
            site,
            files_dir: None,
        }
    }

    pub fn with_files_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.files_dir = Some(dir.into());
        self
    }

    /// Wire the SQLite store and on-disk blob store found under `root`.
    pub fn open(root: &Path) -> weekend_core::Result<Self> {
        let config = Config::load(root)?;
        let portfolio = Portfolio::open(root, &config)?;
        Ok(Self::new(portfolio, config.site).with_files_dir(paths::assets_dir(root)))
    }
}
