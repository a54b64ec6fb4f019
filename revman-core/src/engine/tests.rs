use std::collections::HashSet;
use std::time::Duration;

use super::AssignmentEngine;
use crate::memory::InMemoryStore;
use crate::model::{PrStatus, Team, TeamMember};
use crate::store::TransactionRunner;
use crate::{Entity, Error};

fn engine(seed: u64) -> AssignmentEngine<InMemoryStore> {
    AssignmentEngine::with_seed(InMemoryStore::new(), seed)
}

fn team_of(name: &str, active: &[&str], inactive: &[&str]) -> Team {
    let mut team = Team::new(name);
    for id in active {
        team = team.with_member(TeamMember::active(*id, format!("name-{}", id)));
    }
    for id in inactive {
        team = team.with_member(TeamMember::inactive(*id, format!("name-{}", id)));
    }
    team
}

#[tokio::test]
async fn test_add_and_get_team() {
    let engine = engine(1);
    let team = team_of("backend", &["u1", "u2"], &["u3"]);

    let created = engine.add_team(&team).await.unwrap();
    assert_eq!(created, team);

    let fetched = engine.get_team("backend").await.unwrap();
    assert_eq!(fetched.team_name, "backend");
    let ids: Vec<_> = fetched.members.iter().map(|m| m.user_id.as_str()).collect();
    assert_eq!(ids, vec!["u1", "u2", "u3"]);
    assert!(!fetched.members[2].is_active);
}

#[tokio::test]
async fn test_add_team_twice_fails() {
    let engine = engine(1);
    let team = team_of("backend", &["u1"], &[]);

    engine.add_team(&team).await.unwrap();
    let err = engine.add_team(&team).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(Entity::Team, ref name) if name == "backend"));
}

#[tokio::test]
async fn test_add_team_validation_happens_first() {
    let engine = engine(1);
    let err = engine.add_team(&Team::new("empty")).await.unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    // nothing was written
    assert!(matches!(
        engine.get_team("empty").await,
        Err(Error::NotFound(Entity::Team, _))
    ));
}

#[tokio::test]
async fn test_get_team_errors() {
    let engine = engine(1);
    assert!(matches!(engine.get_team("").await, Err(Error::BadRequest(_))));
    assert!(matches!(
        engine.get_team("missing").await,
        Err(Error::NotFound(Entity::Team, _))
    ));
}

#[tokio::test]
async fn test_team_with_existing_user_moves_them() {
    let engine = engine(1);
    engine
        .add_team(&team_of("backend", &["u1", "u2"], &[]))
        .await
        .unwrap();
    engine
        .add_team(&team_of("frontend", &["u2", "u9"], &[]))
        .await
        .unwrap();

    let backend = engine.get_team("backend").await.unwrap();
    assert_eq!(backend.members.len(), 1);
    let frontend = engine.get_team("frontend").await.unwrap();
    assert_eq!(frontend.members.len(), 2);
}

#[tokio::test]
async fn test_create_validation() {
    let engine = engine(1);
    for (id, name, author) in [("", "n", "a"), ("id", "", "a"), ("id", "n", "")] {
        let err = engine.create_pull_request(id, name, author).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}

#[tokio::test]
async fn test_create_unknown_author() {
    let engine = engine(1);
    let err = engine
        .create_pull_request("pr-1", "Fix bug", "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(Entity::User, _)));
}

#[tokio::test]
async fn test_create_duplicate_id() {
    let engine = engine(1);
    engine
        .add_team(&team_of("backend", &["u1", "u2"], &[]))
        .await
        .unwrap();

    engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();
    let err = engine
        .create_pull_request("pr-1", "Another", "u2")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(Entity::PullRequest, _)));
    assert_eq!(err.code(), "PR_EXISTS");
}

#[tokio::test]
async fn test_create_with_no_candidates() {
    let engine = engine(1);
    engine
        .add_team(&team_of("solo", &["u1"], &["u2"]))
        .await
        .unwrap();

    let pr = engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();
    assert!(pr.assigned_reviewers.is_empty());
    assert_eq!(pr.status, PrStatus::Open);
    assert!(pr.created_at.is_some());
}

#[tokio::test]
async fn test_create_caps_and_never_self_reviews() {
    let members = ["u1", "u2", "u3", "u4", "u5", "u6"];
    for seed in 0..50 {
        let engine = engine(seed);
        engine
            .add_team(&team_of("backend", &members, &["u7"]))
            .await
            .unwrap();

        let pr = engine
            .create_pull_request("pr-1", "Fix bug", "u3")
            .await
            .unwrap();

        assert_eq!(pr.assigned_reviewers.len(), 2);
        let unique: HashSet<_> = pr.assigned_reviewers.iter().collect();
        assert_eq!(unique.len(), 2, "duplicate reviewer with seed {}", seed);
        assert!(!pr.is_reviewed_by("u3"));
        assert!(!pr.is_reviewed_by("u7"));
    }
}

#[tokio::test]
async fn test_create_only_picks_from_author_team() {
    let engine = engine(5);
    engine
        .add_team(&team_of("backend", &["u1", "u2", "u3"], &[]))
        .await
        .unwrap();
    engine
        .add_team(&team_of("frontend", &["f1", "f2"], &[]))
        .await
        .unwrap();

    let pr = engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();
    let mut reviewers = pr.assigned_reviewers.clone();
    reviewers.sort();
    assert_eq!(reviewers, vec!["u2".to_string(), "u3".to_string()]);
}

#[tokio::test]
async fn test_create_rolls_back_when_assignment_fails() {
    let engine = engine(1);
    engine
        .add_team(&team_of("backend", &["u1", "u2"], &[]))
        .await
        .unwrap();

    engine.transactions().fail_next_assignment();
    let err = engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap_err();
    assert!(err.is_internal());

    assert!(engine
        .transactions()
        .committed_pull_request("pr-1")
        .await
        .is_none());
    assert!(matches!(
        engine.merge_pull_request("pr-1").await,
        Err(Error::NotFound(Entity::PullRequest, _))
    ));

    // the ID is still free
    engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_merge_is_idempotent() {
    let engine = engine(1);
    engine
        .add_team(&team_of("backend", &["u1", "u2"], &[]))
        .await
        .unwrap();
    engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();

    let first = engine.merge_pull_request("pr-1").await.unwrap();
    assert_eq!(first.status, PrStatus::Merged);
    assert!(first.merged_at.is_some());
    assert_eq!(first.assigned_reviewers, vec!["u2".to_string()]);

    let second = engine.merge_pull_request("pr-1").await.unwrap();
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_merge_errors() {
    let engine = engine(1);
    assert!(matches!(
        engine.merge_pull_request("").await,
        Err(Error::BadRequest(_))
    ));
    assert!(matches!(
        engine.merge_pull_request("missing").await,
        Err(Error::NotFound(Entity::PullRequest, _))
    ));
}

#[tokio::test]
async fn test_reassign_picks_from_remaining_pool() {
    for seed in 0..30 {
        let engine = engine(seed);
        engine
            .add_team(&team_of("backend", &["u1", "a", "b"], &[]))
            .await
            .unwrap();
        let pr = engine
            .create_pull_request("pr-1", "Fix bug", "u1")
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers.len(), 2);

        // grow the team after creation so the eligible set is exactly {c, d}
        join_team(&engine, "backend", &["c", "d"]).await;

        let outgoing = pr.assigned_reviewers[0].clone();
        let staying = pr.assigned_reviewers[1].clone();
        let result = engine.reassign_reviewer("pr-1", &outgoing).await.unwrap();
        assert!(result.replaced_by == "c" || result.replaced_by == "d");

        let after = engine.merge_pull_request("pr-1").await.unwrap();
        assert_eq!(after.assigned_reviewers.len(), 2);
        assert!(after.is_reviewed_by(&result.replaced_by));
        assert!(after.is_reviewed_by(&staying));
        assert!(!after.is_reviewed_by(&outgoing));
    }
}

/// Add active users to an existing team directly through the store
async fn join_team(engine: &AssignmentEngine<InMemoryStore>, team_name: &str, user_ids: &[&str]) {
    let mut tx = engine.transactions().begin().await.unwrap();
    tx.upsert_users(&team_of(team_name, user_ids, &[])).await.unwrap();
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_reassign_no_candidate_leaves_reviewers_untouched() {
    let engine = engine(1);
    engine
        .add_team(&team_of("backend", &["u1", "u2", "u3"], &[]))
        .await
        .unwrap();
    let pr = engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();

    let err = engine
        .reassign_reviewer("pr-1", &pr.assigned_reviewers[0])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoCandidate(_)));

    let after = engine.merge_pull_request("pr-1").await.unwrap();
    assert_eq!(after.assigned_reviewers, pr.assigned_reviewers);
}

#[tokio::test]
async fn test_reassign_merged_pull_request() {
    let engine = engine(1);
    engine
        .add_team(&team_of("backend", &["u1", "u2", "u3", "u4"], &[]))
        .await
        .unwrap();
    let pr = engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();
    engine.merge_pull_request("pr-1").await.unwrap();

    let err = engine
        .reassign_reviewer("pr-1", &pr.assigned_reviewers[0])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PrMerged(_)));
    assert_eq!(err.code(), "PR_MERGED");

    let after = engine.merge_pull_request("pr-1").await.unwrap();
    assert_eq!(after.assigned_reviewers, pr.assigned_reviewers);
}

#[tokio::test]
async fn test_reassign_errors() {
    let engine = engine(1);
    engine
        .add_team(&team_of("backend", &["u1", "u2", "u3"], &[]))
        .await
        .unwrap();
    engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();

    assert!(matches!(
        engine.reassign_reviewer("", "u2").await,
        Err(Error::BadRequest(_))
    ));
    assert!(matches!(
        engine.reassign_reviewer("pr-1", "ghost").await,
        Err(Error::NotFound(Entity::User, _))
    ));
    assert!(matches!(
        engine.reassign_reviewer("missing", "u2").await,
        Err(Error::NotFound(Entity::PullRequest, _))
    ));
    // the author is a known user but never a reviewer
    assert!(matches!(
        engine.reassign_reviewer("pr-1", "u1").await,
        Err(Error::NotAssigned { .. })
    ));
}

#[tokio::test]
async fn test_concrete_scenario() {
    let engine = engine(11);
    engine
        .add_team(&team_of("T1", &["u1", "u2"], &["u3"]))
        .await
        .unwrap();

    let pr = engine
        .create_pull_request("pr1", "Fix bug", "u1")
        .await
        .unwrap();
    assert_eq!(pr.assigned_reviewers, vec!["u2".to_string()]);

    let u3 = engine.set_user_active("u3", true).await.unwrap();
    assert!(u3.is_active);
    assert_eq!(u3.team_name, "T1");

    let first = engine.reassign_reviewer("pr1", "u2").await.unwrap();
    assert_eq!(first.replaced_by, "u3");

    // only current reviewers are excluded, so u2 is eligible again
    let second = engine.reassign_reviewer("pr1", "u3").await.unwrap();
    assert_eq!(second.replaced_by, "u2");
}

#[tokio::test]
async fn test_set_user_active_errors() {
    let engine = engine(1);
    assert!(matches!(
        engine.set_user_active("", true).await,
        Err(Error::BadRequest(_))
    ));
    assert!(matches!(
        engine.set_user_active("ghost", false).await,
        Err(Error::NotFound(Entity::User, _))
    ));
}

#[tokio::test]
async fn test_review_report() {
    let engine = engine(1);
    engine
        .add_team(&team_of("backend", &["u1", "u2"], &[]))
        .await
        .unwrap();
    engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();
    engine
        .create_pull_request("pr-2", "Add feature", "u1")
        .await
        .unwrap();
    engine.merge_pull_request("pr-2").await.unwrap();

    let report = engine.review_report("u2").await.unwrap();
    assert_eq!(report.user_id, "u2");
    let ids: Vec<_> = report
        .pull_requests
        .iter()
        .map(|pr| (pr.pull_request_id.as_str(), pr.status))
        .collect();
    assert_eq!(ids, vec![("pr-1", PrStatus::Open), ("pr-2", PrStatus::Merged)]);

    assert!(engine.review_report("u1").await.unwrap().pull_requests.is_empty());
    assert!(engine.review_report("ghost").await.unwrap().pull_requests.is_empty());
    assert!(matches!(
        engine.review_report("").await,
        Err(Error::BadRequest(_))
    ));
}

#[tokio::test]
async fn test_deadline_drops_transaction() {
    let store = InMemoryStore::new();
    let engine =
        AssignmentEngine::with_seed(store.clone(), 1).with_deadline(Duration::from_millis(20));

    // hold the store so the operation cannot begin its transaction in time
    let blocker = store.begin().await.unwrap();
    let err = engine
        .add_team(&team_of("backend", &["u1"], &[]))
        .await
        .unwrap_err();
    assert!(err.is_internal());
    drop(blocker);

    assert!(matches!(
        engine.get_team("backend").await,
        Err(Error::NotFound(Entity::Team, _))
    ));
}

#[tokio::test]
async fn test_concurrent_reassign_and_merge_stay_consistent() {
    let engine = std::sync::Arc::new(engine(3));
    engine
        .add_team(&team_of("backend", &["u1", "u2", "u3", "u4", "u5"], &[]))
        .await
        .unwrap();
    let pr = engine
        .create_pull_request("pr-1", "Fix bug", "u1")
        .await
        .unwrap();

    let outgoing = pr.assigned_reviewers[0].clone();
    let reassign = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.reassign_reviewer("pr-1", &outgoing).await })
    };
    let merge = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.merge_pull_request("pr-1").await })
    };

    let reassigned = reassign.await.unwrap();
    merge.await.unwrap().unwrap();

    let final_pr = engine.merge_pull_request("pr-1").await.unwrap();
    assert_eq!(final_pr.assigned_reviewers.len(), 2);
    assert!(!final_pr.is_reviewed_by("u1"));
    match reassigned {
        Ok(r) => assert!(final_pr.is_reviewed_by(&r.replaced_by)),
        Err(err) => {
            assert!(matches!(err, Error::PrMerged(_)));
            assert_eq!(final_pr.assigned_reviewers, pr.assigned_reviewers);
        }
    }
}
