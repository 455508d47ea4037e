use super::*;

impl TeamAccessService {
    /// Returns the access level a user holds on a team, if any.
    pub async fn access_level(
        &self,
        user_id: UserId,
        team_id: TeamId,
    ) -> AppResult<Option<AccessLevel>> {
        Ok(self
            .access_grant_repository
            .find_grant(user_id, team_id)
            .await?
            .map(|grant| grant.level()))
    }

    /// Returns whether the user holds any grant on the team.
    pub async fn has_access(&self, user_id: UserId, team_id: TeamId) -> AppResult<bool> {
        Ok(self.access_level(user_id, team_id).await?.is_some())
    }

    /// Returns whether the user holds the owner grant on the team.
    pub async fn has_owner_access(&self, user_id: UserId, team_id: TeamId) -> AppResult<bool> {
        Ok(self.access_level(user_id, team_id).await? == Some(AccessLevel::Owner))
    }

    pub(super) async fn require_team(&self, team_id: TeamId) -> AppResult<Team> {
        self.team_repository
            .find_team(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team '{team_id}' not found")))
    }

    pub(super) async fn require_user(&self, user_id: UserId) -> AppResult<User> {
        self.user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    pub(super) async fn require_access(&self, user_id: UserId, team_id: TeamId) -> AppResult<()> {
        if self.has_access(user_id, team_id).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' has no access to team '{team_id}'"
        )))
    }

    pub(super) async fn require_owner(
        &self,
        user_id: UserId,
        team_id: TeamId,
        action: &str,
    ) -> AppResult<()> {
        let level = self.access_level(user_id, team_id).await?;
        if level.is_some_and(|level| level.can_share()) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "only owner can {action} team '{team_id}'"
        )))
    }
}
