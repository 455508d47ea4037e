use async_trait::async_trait;
use staffdesk_core::AppResult;
use staffdesk_domain::{AccessGrant, MembershipChanges, Team, TeamId, TeamMembership, User, UserId};

/// Input payload for team creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTeamInput {
    /// Team display name.
    pub name: String,
}

/// Repository port for user lookups.
///
/// Users are provisioned outside team access control and are read-only here.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns one user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Returns one user by normalized login.
    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Returns the subset of `user_ids` that resolve to stored users.
    async fn find_users(&self, user_ids: &[UserId]) -> AppResult<Vec<User>>;
}

/// Repository port for teams.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Persists a team and its creator's owner grant in one unit of work.
    ///
    /// Fails with `NotFound` and persists nothing when the grant's user does
    /// not exist.
    async fn create_team_with_owner(&self, team: Team, owner_grant: AccessGrant) -> AppResult<()>;

    /// Returns one team by identifier.
    async fn find_team(&self, team_id: TeamId) -> AppResult<Option<Team>>;

    /// Saves a changed team name after re-validating `owner`'s owner grant.
    async fn rename_team_as_owner(&self, team: Team, owner: UserId) -> AppResult<()>;

    /// Lists teams the user holds any grant on, sorted by team name.
    async fn list_teams_for_user(&self, user_id: UserId) -> AppResult<Vec<TeamMembership>>;

    /// Deletes every grant of a team, then the team itself.
    ///
    /// `owner`'s owner grant is locked and re-validated first, so concurrent
    /// owner-only writes on the team are serialized. Fails with `Forbidden`
    /// when it no longer holds. Returns whether a team row was removed.
    async fn delete_team_as_owner(&self, team_id: TeamId, owner: UserId) -> AppResult<bool>;
}

/// Repository port for team access grants.
///
/// Methods suffixed `_as_owner` re-validate the acting user's owner grant
/// inside the same unit of work as the write and fail with `Forbidden` when
/// it no longer holds.
#[async_trait]
pub trait AccessGrantRepository: Send + Sync {
    /// Returns the grant for one user and team, if any.
    async fn find_grant(&self, user_id: UserId, team_id: TeamId)
    -> AppResult<Option<AccessGrant>>;

    /// Lists all grants of a team.
    async fn list_grants_for_team(&self, team_id: TeamId) -> AppResult<Vec<AccessGrant>>;

    /// Gives `grantee` viewer access unless it already holds a grant.
    ///
    /// Returns the grantee's grant after the write.
    async fn grant_viewer_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        grantee: UserId,
    ) -> AppResult<AccessGrant>;

    /// Removes a viewer grant. Fails with `Conflict` for owner grants.
    ///
    /// Returns whether a grant was removed.
    async fn revoke_viewer_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        user_id: UserId,
    ) -> AppResult<bool>;

    /// Promotes `new_owner` to owner and demotes `owner` to viewer.
    async fn transfer_ownership_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        new_owner: UserId,
    ) -> AppResult<()>;

    /// Applies reconciliation changes. Owner grants are never revoked.
    async fn apply_membership_changes_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        changes: &MembershipChanges,
    ) -> AppResult<()>;
}
