mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, project::ProjectSubcommand, user::UserSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "weekend",
    about = "Weekend project portfolio: plans, checklists and progress",
    version,
    propagate_version = true
)]
struct Cli {
    /// Portfolio root (default: auto-detect from .weekend/)
    #[arg(long, global = true, env = "WEEKEND_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .weekend/ with config, database and asset directory
    Init {
        /// Site name shown on the portfolio (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Run the HTTP server
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,

        /// Open the site in a browser once listening
        #[arg(long)]
        open: bool,
    },

    /// Parse a markdown plan and show the checklist it produces
    Plan {
        /// Plan file, or `-` for stdin
        file: PathBuf,
    },

    /// Inspect projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Manage users and sessions
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Upsert projects from a YAML or JSON file
    Seed { file: PathBuf },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), cli.json),
        Commands::Serve { port, open } => cmd::serve::run(&root, port, open),
        Commands::Plan { file } => cmd::plan::run(&file, cli.json),
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
        Commands::Seed { file } => cmd::seed::run(&root, &file, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
