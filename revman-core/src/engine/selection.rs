//! Random reviewer selection

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{PullRequest, MAX_REVIEWERS};

/// Pick up to [`MAX_REVIEWERS`] distinct candidates uniformly at random
pub fn pick_reviewers<R: Rng + ?Sized>(candidates: &[String], rng: &mut R) -> Vec<String> {
    candidates
        .choose_multiple(rng, MAX_REVIEWERS)
        .cloned()
        .collect()
}

/// Pick one candidate uniformly at random
pub fn pick_replacement<R: Rng + ?Sized>(candidates: &[String], rng: &mut R) -> Option<String> {
    candidates.choose(rng).cloned()
}

/// Drop the author and everyone currently reviewing the pull request
pub fn eligible_replacements(mut candidates: Vec<String>, pr: &PullRequest) -> Vec<String> {
    candidates.retain(|c| *c != pr.author_id && !pr.is_reviewed_by(c));
    candidates
}
