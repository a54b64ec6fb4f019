//! Revman Core - Reviewer assignment for pull requests
//!
//! This crate provides the domain model, the store capabilities and the
//! assignment engine that picks, replaces and freezes pull request
//! reviewers. Storage backends live in their own crates and plug in
//! through [`TransactionRunner`].

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod model;
pub mod store;
pub mod validate;

pub use config::{Config, DatabaseConfig, EngineConfig};
pub use engine::AssignmentEngine;
pub use error::{Entity, Error, Result};
pub use memory::InMemoryStore;
pub use model::{
    PrStatus, PullRequest, PullRequestShort, Reassignment, ReviewReport, Team, TeamMember, User,
};
pub use store::{PullRequestStore, TeamDirectory, Transaction, TransactionRunner, UserDirectory};
