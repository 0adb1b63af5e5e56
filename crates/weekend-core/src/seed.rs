use crate::error::Result;
use crate::project::NewProject;
use serde::Deserialize;
use std::path::Path;

/// Seed file layout: `projects: [...]`.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedFile {
    pub projects: Vec<NewProject>,
}

impl SeedFile {
    /// Read a seed file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(serde_yaml::from_str(&data)?)
        }
    }
}

/// Titles must be non-blank and numbers unique within one batch.
pub fn validate_projects(projects: &[NewProject]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for p in projects {
        if p.title.trim().is_empty() {
            return Err(crate::WeekendError::Validation(format!(
                "project {} has an empty title",
                p.number
            )));
        }
        if !seen.insert(p.number) {
            return Err(crate::WeekendError::Validation(format!(
                "project number {} appears more than once",
                p.number
            )));
        }
    }
    Ok(())
}
