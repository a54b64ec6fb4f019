//! User commands

use clap::{ArgAction, Args, Subcommand};
use revman_core::{AssignmentEngine, TransactionRunner};

use super::print_json;

/// User commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Activate or deactivate a user
    SetActive {
        /// User ID
        user_id: String,

        /// New status
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },

    /// List the pull requests a user reviews
    Reviews {
        /// User ID
        user_id: String,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute<T: TransactionRunner>(
        &self,
        engine: &AssignmentEngine<T>,
    ) -> anyhow::Result<()> {
        match &self.command {
            UserCommand::SetActive { user_id, active } => {
                let user = engine.set_user_active(user_id, *active).await?;
                print_json(&user)
            }
            UserCommand::Reviews { user_id } => {
                let report = engine.review_report(user_id).await?;
                print_json(&report)
            }
        }
    }
}
