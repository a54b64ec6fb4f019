//! Reviewer assignment engine
//!
//! The engine is stateless between calls apart from its random source.
//! Every operation validates its input first, then runs all of its reads
//! and writes inside a single transaction obtained from the configured
//! [`TransactionRunner`]. Concurrent operations on the same pull request
//! are serialized by the store, never by in-process locks.

mod pull_request;
pub mod selection;
mod team;
mod user;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::store::TransactionRunner;
use crate::{Error, Result};

/// Assigns, reassigns and merges pull requests over a transactional store
pub struct AssignmentEngine<T> {
    transactions: T,
    rng: Mutex<StdRng>,
    deadline: Option<Duration>,
}

impl<T: TransactionRunner> AssignmentEngine<T> {
    /// Create an engine with an entropy-seeded random source
    pub fn new(transactions: T) -> Self {
        Self::with_rng(transactions, StdRng::from_entropy())
    }

    /// Create an engine with deterministic reviewer selection
    pub fn with_seed(transactions: T, seed: u64) -> Self {
        Self::with_rng(transactions, StdRng::seed_from_u64(seed))
    }

    /// Create an engine from configuration
    pub fn from_config(transactions: T, config: &EngineConfig) -> Self {
        let engine = match config.seed {
            Some(seed) => Self::with_seed(transactions, seed),
            None => Self::new(transactions),
        };
        match config.operation_timeout {
            Some(deadline) => engine.with_deadline(deadline),
            None => engine,
        }
    }

    fn with_rng(transactions: T, rng: StdRng) -> Self {
        Self {
            transactions,
            rng: Mutex::new(rng),
            deadline: None,
        }
    }

    /// Abort any operation that runs longer than `deadline`
    ///
    /// An aborted operation's transaction is dropped, so nothing it staged
    /// is committed.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Get the underlying transaction runner
    pub fn transactions(&self) -> &T {
        &self.transactions
    }

    async fn bounded<O>(&self, operation: impl Future<Output = Result<O>>) -> Result<O> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, operation)
                .await
                .map_err(|_| Error::Internal("operation deadline exceeded".to_string()))?,
            None => operation.await,
        }
    }
}
