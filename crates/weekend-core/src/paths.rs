use std::path::{Path, PathBuf};

pub const WEEKEND_DIR: &str = ".weekend";
pub const CONFIG_FILE: &str = ".weekend/config.yaml";
pub const DATABASE_FILE: &str = ".weekend/portfolio.db";
pub const ASSETS_DIR: &str = ".weekend/assets";

pub fn weekend_dir(root: &Path) -> PathBuf {
    root.join(WEEKEND_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

pub fn assets_dir(root: &Path) -> PathBuf {
    root.join(ASSETS_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_weekend_dir() {
        let root = Path::new("/tmp/site");
        assert!(config_path(root).starts_with(weekend_dir(root)));
        assert!(database_path(root).starts_with(weekend_dir(root)));
        assert!(assets_dir(root).starts_with(weekend_dir(root)));
    }
}
