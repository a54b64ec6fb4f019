use serde::{Deserialize, Serialize};

use super::PullRequestShort;
use super::TeamMember;

/// A user with their team membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl User {
    /// Build a user record from a submitted team member
    pub fn from_member(member: &TeamMember, team_name: &str) -> Self {
        Self {
            user_id: member.user_id.clone(),
            username: member.username.clone(),
            team_name: team_name.to_string(),
            is_active: member.is_active,
        }
    }

    /// Strip the team reference
    pub fn to_member(&self) -> TeamMember {
        TeamMember {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            is_active: self.is_active,
        }
    }
}

/// Pull requests a user is currently assigned to review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}
