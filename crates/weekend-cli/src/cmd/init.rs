use anyhow::Context;
use std::path::Path;
use weekend_core::{config::Config, io, paths, store::SqliteStore};

use crate::output::print_json;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let site_name = name.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Weekend projects".to_string())
    });

    let assets = paths::assets_dir(root);
    io::ensure_dir(&assets).with_context(|| format!("failed to create {}", assets.display()))?;

    let config_path = paths::config_path(root);
    let config_created = !config_path.exists();
    if config_created {
        Config::new(&site_name)
            .save(root)
            .context("failed to write config.yaml")?;
    }

    let db_path = paths::database_path(root);
    let db_created = !db_path.exists();
    SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "root": root,
            "config_created": config_created,
            "database_created": db_created,
        }));
    }

    println!("Initializing weekend in: {}", root.display());
    let status = |created: bool| if created { "created:" } else { "exists: " };
    println!("  {} {}", status(config_created), paths::CONFIG_FILE);
    println!("  {} {}", status(db_created), paths::DATABASE_FILE);
    println!("  ready:   {}", paths::ASSETS_DIR);
    Ok(())
}
