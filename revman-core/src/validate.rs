//! Input validation, applied before any store access

use crate::model::Team;
use crate::{Error, Result};

/// Reject an empty identifier or name
pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::bad_request(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Validate a pull request creation request
pub fn pull_request(id: &str, name: &str, author_id: &str) -> Result<()> {
    require_non_empty("pull_request_id", id)?;
    require_non_empty("pull_request_name", name)?;
    require_non_empty("author_id", author_id)
}

/// Validate a reassignment request
pub fn reassignment(pull_request_id: &str, user_id: &str) -> Result<()> {
    require_non_empty("pull_request_id", pull_request_id)?;
    require_non_empty("old_user_id", user_id)
}

/// Validate a team creation request
///
/// The team needs a name and at least one member, and every member needs
/// an ID and a username.
pub fn team(team: &Team) -> Result<()> {
    require_non_empty("team_name", &team.team_name)?;
    if team.members.is_empty() {
        return Err(Error::bad_request("team must have at least one member"));
    }
    for member in &team.members {
        require_non_empty("user_id", &member.user_id)?;
        require_non_empty("username", &member.username)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeamMember;

    #[test]
    fn test_pull_request_fields() {
        assert!(pull_request("pr-1", "Fix bug", "u1").is_ok());
        assert!(matches!(pull_request("", "Fix bug", "u1"), Err(Error::BadRequest(_))));
        assert!(matches!(pull_request("pr-1", "", "u1"), Err(Error::BadRequest(_))));
        assert!(matches!(pull_request("pr-1", "Fix bug", ""), Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_reassignment_fields() {
        assert!(reassignment("pr-1", "u2").is_ok());
        assert!(reassignment("", "u2").is_err());
        assert!(reassignment("pr-1", "").is_err());
    }

    #[test]
    fn test_team_validation() {
        let valid = Team::new("backend")
            .with_member(TeamMember::active("u1", "Alice"))
            .with_member(TeamMember::inactive("u2", "Bob"));
        assert!(team(&valid).is_ok());

        let cases = [
            Team::new("").with_member(TeamMember::active("u1", "Alice")),
            Team::new("backend"),
            Team::new("backend")
                .with_member(TeamMember::active("u1", "Alice"))
                .with_member(TeamMember::active("", "Bob")),
            Team::new("backend")
                .with_member(TeamMember::active("u1", "Alice"))
                .with_member(TeamMember::active("u2", "")),
        ];
        for case in &cases {
            assert!(
                matches!(team(case), Err(Error::BadRequest(_))),
                "expected bad request for {:?}",
                case
            );
        }
    }
}
