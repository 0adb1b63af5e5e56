use crate::cmd::open_portfolio;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;
use weekend_core::time_log::format_minutes;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// List projects with progress
    List,

    /// Show one project and its iterations
    Show {
        /// Project number
        number: i64,
    },
}

pub fn run(root: &Path, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::List => list(root, json),
        ProjectSubcommand::Show { number } => show(root, number, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let projects = open_portfolio(root)?.projects_with_progress()?;
    if json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects. Seed some with `weekend seed <file>`.");
        return Ok(());
    }

    let rows = projects
        .iter()
        .map(|p| {
            vec![
                p.project.number.to_string(),
                p.project.title.clone(),
                p.iterations.len().to_string(),
                format!(
                    "{}/{} ({}%)",
                    p.completed_checklist_items,
                    p.total_checklist_items,
                    p.percent_complete()
                ),
                format_minutes(p.total_time_minutes),
            ]
        })
        .collect();
    print_table(&["#", "TITLE", "ITERATIONS", "CHECKLIST", "TIME"], rows);
    Ok(())
}

fn show(root: &Path, number: i64, json: bool) -> anyhow::Result<()> {
    let p = open_portfolio(root)?.project_by_number(number)?;
    if json {
        return print_json(&p);
    }

    println!("{}. {}", p.project.number, p.project.title);
    if !p.project.subtitle.is_empty() {
        println!("   {}", p.project.subtitle);
    }
    println!(
        "   checklist {}/{} ({}%), {} logged",
        p.completed_checklist_items,
        p.total_checklist_items,
        p.percent_complete(),
        format_minutes(p.total_time_minutes)
    );
    if p.iterations.is_empty() {
        println!("\nNo iterations yet.");
        return Ok(());
    }

    println!();
    let rows = p
        .iterations
        .iter()
        .map(|it| {
            vec![
                it.version_label.clone(),
                it.status.to_string(),
                format_minutes(it.time_spent_minutes),
                it.id.clone(),
            ]
        })
        .collect();
    print_table(&["VERSION", "STATUS", "TIME", "ID"], rows);
    Ok(())
}
