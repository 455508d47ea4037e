use super::*;

impl TeamAccessService {
    /// Creates a team and makes the creator its owner.
    ///
    /// The team and the owner grant are written in one unit of work; an
    /// unknown creator leaves nothing behind.
    pub async fn create_team(&self, creator: UserId, input: CreateTeamInput) -> AppResult<Team> {
        let team = Team::new(TeamId::new(), input.name)?;
        self.require_user(creator).await?;

        self.team_repository
            .create_team_with_owner(team.clone(), AccessGrant::owner(creator, team.id()))
            .await?;

        Ok(team)
    }

    /// Returns one team visible to the actor.
    pub async fn get_team(&self, actor: UserId, team_id: TeamId) -> AppResult<Team> {
        let team = self.require_team(team_id).await?;
        self.require_access(actor, team_id).await?;
        Ok(team)
    }

    /// Lists teams the actor can access along with its access level.
    pub async fn list_teams(&self, actor: UserId) -> AppResult<Vec<TeamMembership>> {
        self.team_repository.list_teams_for_user(actor).await
    }

    /// Renames a team. Owner only.
    pub async fn rename_team(
        &self,
        actor: UserId,
        team_id: TeamId,
        name: impl Into<String>,
    ) -> AppResult<Team> {
        let team = self.require_team(team_id).await?;
        self.require_owner(actor, team_id, "rename").await?;

        let renamed = team.renamed(name)?;
        self.team_repository
            .rename_team_as_owner(renamed.clone(), actor)
            .await?;

        Ok(renamed)
    }

    /// Deletes a team and every access grant attached to it. Owner only.
    pub async fn delete_team(&self, actor: UserId, team_id: TeamId) -> AppResult<()> {
        self.require_team(team_id).await?;
        self.require_owner(actor, team_id, "delete").await?;

        if !self
            .team_repository
            .delete_team_as_owner(team_id, actor)
            .await?
        {
            return Err(AppError::NotFound(format!("team '{team_id}' not found")));
        }

        Ok(())
    }
}
