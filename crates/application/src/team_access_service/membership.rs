use super::*;

impl TeamAccessService {
    /// Lists every grant of a team visible to the actor.
    pub async fn list_team_grants(
        &self,
        actor: UserId,
        team_id: TeamId,
    ) -> AppResult<Vec<AccessGrant>> {
        self.require_team(team_id).await?;
        self.require_access(actor, team_id).await?;
        self.access_grant_repository
            .list_grants_for_team(team_id)
            .await
    }

    /// Reconciles team grants with the desired set of users.
    ///
    /// Viewers missing from `desired_users` lose access, users in
    /// `desired_users` without a grant become viewers. Owner grants are
    /// left untouched. Calling this twice with the same set is a no-op the
    /// second time.
    pub async fn update_team_users(
        &self,
        actor: UserId,
        team_id: TeamId,
        desired_users: &BTreeSet<UserId>,
    ) -> AppResult<MembershipChanges> {
        self.require_team(team_id).await?;
        self.require_owner(actor, team_id, "update members of")
            .await?;
        self.require_all_users(desired_users).await?;

        let current = self
            .access_grant_repository
            .list_grants_for_team(team_id)
            .await?;
        let changes = plan_membership_changes(&current, desired_users);

        if !changes.is_empty() {
            self.access_grant_repository
                .apply_membership_changes_as_owner(team_id, actor, &changes)
                .await?;
        }

        Ok(changes)
    }

    async fn require_all_users(&self, user_ids: &BTreeSet<UserId>) -> AppResult<()> {
        let requested: Vec<UserId> = user_ids.iter().copied().collect();
        let found: BTreeSet<UserId> = self
            .user_repository
            .find_users(&requested)
            .await?
            .iter()
            .map(User::id)
            .collect();

        match requested.iter().find(|user_id| !found.contains(user_id)) {
            Some(missing) => Err(AppError::NotFound(format!("user '{missing}' not found"))),
            None => Ok(()),
        }
    }
}
