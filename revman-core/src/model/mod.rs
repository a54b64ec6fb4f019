//! Domain types shared by the engine, the stores and the CLI

mod pull_request;
mod team;
mod user;

pub use pull_request::{PrStatus, PullRequest, PullRequestShort, Reassignment, MAX_REVIEWERS};
pub use team::{Team, TeamMember};
pub use user::{ReviewReport, User};
