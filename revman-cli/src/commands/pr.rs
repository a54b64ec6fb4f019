//! Pull request commands

use clap::{Args, Subcommand};
use revman_core::{AssignmentEngine, TransactionRunner};

use super::print_json;

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Create a pull request and assign reviewers from the author's team
    Create {
        /// Pull request ID
        #[arg(long)]
        id: String,

        /// Pull request title
        #[arg(long)]
        name: String,

        /// Author's user ID
        #[arg(long)]
        author: String,
    },

    /// Mark a pull request as merged
    Merge {
        /// Pull request ID
        id: String,
    },

    /// Replace one reviewer with another member of their team
    Reassign {
        /// Pull request ID
        #[arg(long)]
        id: String,

        /// User ID of the reviewer to replace
        #[arg(long)]
        old_reviewer: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute<T: TransactionRunner>(
        &self,
        engine: &AssignmentEngine<T>,
    ) -> anyhow::Result<()> {
        match &self.command {
            PrCommand::Create { id, name, author } => {
                let pr = engine.create_pull_request(id, name, author).await?;
                print_json(&pr)
            }
            PrCommand::Merge { id } => {
                let pr = engine.merge_pull_request(id).await?;
                print_json(&pr)
            }
            PrCommand::Reassign { id, old_reviewer } => {
                let reassignment = engine.reassign_reviewer(id, old_reviewer).await?;
                print_json(&reassignment)
            }
        }
    }
}
