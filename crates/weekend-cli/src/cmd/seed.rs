use crate::cmd::open_portfolio;
use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use weekend_core::seed::SeedFile;

pub fn run(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let seed = SeedFile::load(file).with_context(|| format!("failed to load {}", file.display()))?;

    let projects = open_portfolio(root)?.seed_projects_unchecked(&seed.projects)?;
    if json {
        return print_json(&projects);
    }
    for p in &projects {
        println!("  seeded: {}. {}", p.number, p.title);
    }
    println!("{} project(s) seeded.", projects.len());
    Ok(())
}
