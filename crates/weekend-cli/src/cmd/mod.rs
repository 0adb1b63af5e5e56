pub mod config;
pub mod init;
pub mod plan;
pub mod project;
pub mod seed;
pub mod serve;
pub mod user;

use anyhow::Context;
use std::path::Path;
use weekend_core::actions::Portfolio;
use weekend_core::config::Config;

/// Load config and open the local portfolio under `root`.
pub fn open_portfolio(root: &Path) -> anyhow::Result<Portfolio> {
    let config = Config::load(root)?;
    Portfolio::open(root, &config).context("failed to open portfolio database")
}
