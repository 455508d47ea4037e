use super::*;

impl TeamAccessService {
    /// Shares read access to a team with another user.
    ///
    /// Only an owner may share. Sharing with a user that already holds a
    /// grant returns the existing grant unchanged.
    pub async fn grant_access(
        &self,
        team_id: TeamId,
        owner: UserId,
        grantee: UserId,
    ) -> AppResult<AccessGrant> {
        self.require_team(team_id).await?;
        self.require_owner(owner, team_id, "share access to").await?;
        self.require_user(grantee).await?;

        self.access_grant_repository
            .grant_viewer_as_owner(team_id, owner, grantee)
            .await
    }

    /// Removes a viewer's access to a team. Owner only.
    ///
    /// Owner grants cannot be revoked; use [`Self::transfer_ownership`].
    /// Revoking a user without a grant is a no-op.
    pub async fn revoke_access(
        &self,
        team_id: TeamId,
        owner: UserId,
        user_id: UserId,
    ) -> AppResult<()> {
        self.require_team(team_id).await?;
        self.require_owner(owner, team_id, "revoke access to").await?;

        self.access_grant_repository
            .revoke_viewer_as_owner(team_id, owner, user_id)
            .await?;

        Ok(())
    }

    /// Hands team ownership to another user; the previous owner keeps viewer access.
    pub async fn transfer_ownership(
        &self,
        team_id: TeamId,
        owner: UserId,
        new_owner: UserId,
    ) -> AppResult<()> {
        if owner == new_owner {
            return Err(AppError::Validation(
                "ownership can only be transferred to another user".to_owned(),
            ));
        }

        self.require_team(team_id).await?;
        self.require_owner(owner, team_id, "transfer ownership of")
            .await?;
        self.require_user(new_owner).await?;

        self.access_grant_repository
            .transfer_ownership_as_owner(team_id, owner, new_owner)
            .await
    }
}
