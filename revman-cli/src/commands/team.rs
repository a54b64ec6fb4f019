//! Team commands

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use revman_core::{AssignmentEngine, Error, Team, TeamMember, TransactionRunner};

use super::print_json;

/// Team commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team and upsert its members
    Add {
        /// Team name
        #[arg(long, required_unless_present = "file", conflicts_with = "file")]
        name: Option<String>,

        /// Member as ID:NAME or ID:NAME:inactive (repeatable)
        #[arg(long = "member", value_parser = parse_member, requires = "name")]
        members: Vec<TeamMember>,

        /// Read the team from a JSON file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show a team and its members
    Get {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute<T: TransactionRunner>(
        &self,
        engine: &AssignmentEngine<T>,
    ) -> anyhow::Result<()> {
        match &self.command {
            TeamCommand::Add {
                name,
                members,
                file,
            } => {
                let team = match (file, name) {
                    (Some(path), _) => read_team(path)?,
                    (None, Some(name)) => Team {
                        team_name: name.clone(),
                        members: members.clone(),
                    },
                    (None, None) => {
                        return Err(Error::BadRequest("team name is required".into()).into())
                    }
                };
                let team = engine.add_team(&team).await?;
                print_json(&team)
            }
            TeamCommand::Get { name } => {
                let team = engine.get_team(name).await?;
                print_json(&team)
            }
        }
    }
}

/// Parse `ID:NAME[:inactive]` into a team member
fn parse_member(value: &str) -> Result<TeamMember, String> {
    let mut parts = value.splitn(3, ':');
    let user_id = parts.next().unwrap_or_default();
    let username = parts
        .next()
        .ok_or_else(|| format!("expected ID:NAME[:inactive], got '{}'", value))?;

    match parts.next() {
        None | Some("active") => Ok(TeamMember::active(user_id, username)),
        Some("inactive") => Ok(TeamMember::inactive(user_id, username)),
        Some(other) => Err(format!(
            "unknown member status '{}', expected 'active' or 'inactive'",
            other
        )),
    }
}

fn read_team(path: &Path) -> Result<Team, Error> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::BadRequest(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::BadRequest(format!("Invalid team file {}: {}", path.display(), e)))
}
