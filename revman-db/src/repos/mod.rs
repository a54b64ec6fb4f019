//! Repository functions for database operations
//!
//! Every function runs on a borrowed connection so callers decide the
//! transaction boundary.

pub mod pull_requests;
pub mod teams;
pub mod users;
