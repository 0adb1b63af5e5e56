use crate::cmd::open_portfolio;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;
use weekend_core::types::Role;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Create a user profile
    Create {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// admin or viewer
        #[arg(long, default_value = "viewer")]
        role: Role,
    },

    /// List user profiles
    List,

    /// Issue a session token for a user
    Token {
        /// User id
        user_id: String,
    },
}

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool) -> anyhow::Result<()> {
    let portfolio = open_portfolio(root)?;
    match subcmd {
        UserSubcommand::Create { name, role } => {
            let profile = portfolio.create_user(name.as_deref(), role)?;
            if json {
                print_json(&profile)?;
            } else {
                println!("Created {} user: {}", profile.role, profile.id);
            }
        }
        UserSubcommand::List => {
            let profiles = portfolio.list_users()?;
            if json {
                print_json(&profiles)?;
            } else {
                let rows = profiles
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.clone(),
                            p.role.to_string(),
                            p.display_name.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                print_table(&["ID", "ROLE", "NAME"], rows);
            }
        }
        UserSubcommand::Token { user_id } => {
            let token = portfolio.issue_session(&user_id)?;
            if json {
                print_json(&serde_json::json!({ "user_id": user_id, "token": token }))?;
            } else {
                println!("{token}");
            }
        }
    }
    Ok(())
}
