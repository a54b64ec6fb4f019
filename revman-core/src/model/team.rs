use serde::{Deserialize, Serialize};

/// A group of users reviewing each other's pull requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl Team {
    /// Create a team with no members
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member
    pub fn with_member(mut self, member: TeamMember) -> Self {
        self.members.push(member);
        self
    }
}

/// Team member as submitted on team creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl TeamMember {
    /// Create an active member
    pub fn active(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active: true,
        }
    }

    /// Create an inactive member
    pub fn inactive(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            is_active: false,
            ..Self::active(user_id, username)
        }
    }
}
