use std::collections::HashMap;

use async_trait::async_trait;
use staffdesk_application::{AccessGrantRepository, TeamRepository, UserRepository};
use staffdesk_core::{AppError, AppResult};
use staffdesk_domain::{
    AccessGrant, AccessLevel, MembershipChanges, Team, TeamId, TeamMembership, User, UserId,
    apply_membership_changes,
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct TeamAccessState {
    users: HashMap<UserId, User>,
    teams: HashMap<TeamId, Team>,
    grants: HashMap<(UserId, TeamId), AccessGrant>,
}

impl TeamAccessState {
    fn require_owner(&self, team_id: TeamId, owner: UserId) -> AppResult<()> {
        match self.grants.get(&(owner, team_id)) {
            Some(grant) if grant.is_owner() => Ok(()),
            _ => Err(AppError::Forbidden(format!(
                "only owner can change access to team '{team_id}'"
            ))),
        }
    }

    fn require_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            return Ok(());
        }

        Err(AppError::NotFound(format!("user '{user_id}' not found")))
    }

    fn team_grants(&self, team_id: TeamId) -> Vec<AccessGrant> {
        self.grants
            .values()
            .filter(|grant| grant.team_id() == team_id)
            .cloned()
            .collect()
    }
}

/// In-memory implementation of the user, team and access grant ports.
///
/// All state sits behind one lock, so every multi-step write is atomic.
#[derive(Debug, Default)]
pub struct InMemoryTeamAccessRepository {
    state: RwLock<TeamAccessState>,
}

impl InMemoryTeamAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a user, replacing any user with the same identifier.
    ///
    /// Fails with `Conflict` when another user already holds the login.
    pub async fn insert_user(&self, user: User) -> AppResult<()> {
        let mut state = self.state.write().await;
        let login_taken = state
            .users
            .values()
            .any(|stored| stored.login() == user.login() && stored.id() != user.id());
        if login_taken {
            return Err(AppError::Conflict(format!(
                "login '{}' is already taken",
                user.login().as_str()
            )));
        }

        state.users.insert(user.id(), user);
        Ok(())
    }

    /// Removes a user together with every grant the user holds.
    ///
    /// Returns whether a user was removed.
    pub async fn remove_user(&self, user_id: UserId) -> bool {
        let mut state = self.state.write().await;
        state.grants.retain(|(grant_user_id, _), _| *grant_user_id != user_id);
        state.users.remove(&user_id).is_some()
    }
}

#[async_trait]
impl UserRepository for InMemoryTeamAccessRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let login = login.trim().to_lowercase();
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.login().as_str() == login)
            .cloned())
    }

    async fn find_users(&self, user_ids: &[UserId]) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|user_id| state.users.get(user_id).cloned())
            .collect())
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamAccessRepository {
    async fn create_team_with_owner(&self, team: Team, owner_grant: AccessGrant) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(owner_grant.user_id())?;

        if state.teams.contains_key(&team.id()) {
            return Err(AppError::Conflict(format!(
                "team '{}' already exists",
                team.id()
            )));
        }

        state
            .grants
            .insert((owner_grant.user_id(), team.id()), owner_grant);
        state.teams.insert(team.id(), team);
        Ok(())
    }

    async fn find_team(&self, team_id: TeamId) -> AppResult<Option<Team>> {
        Ok(self.state.read().await.teams.get(&team_id).cloned())
    }

    async fn rename_team_as_owner(&self, team: Team, owner: UserId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_owner(team.id(), owner)?;
        let Some(stored) = state.teams.get_mut(&team.id()) else {
            return Err(AppError::NotFound(format!("team '{}' not found", team.id())));
        };

        *stored = team;
        Ok(())
    }

    async fn list_teams_for_user(&self, user_id: UserId) -> AppResult<Vec<TeamMembership>> {
        let state = self.state.read().await;
        let mut memberships: Vec<TeamMembership> = state
            .grants
            .values()
            .filter(|grant| grant.user_id() == user_id)
            .filter_map(|grant| {
                state
                    .teams
                    .get(&grant.team_id())
                    .map(|team| TeamMembership {
                        team: team.clone(),
                        level: grant.level(),
                    })
            })
            .collect();

        memberships.sort_by(|left, right| {
            left.team
                .name()
                .as_str()
                .cmp(right.team.name().as_str())
                .then_with(|| left.team.id().cmp(&right.team.id()))
        });
        Ok(memberships)
    }

    async fn delete_team_as_owner(&self, team_id: TeamId, owner: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.require_owner(team_id, owner)?;
        state.grants.retain(|(_, grant_team_id), _| *grant_team_id != team_id);
        Ok(state.teams.remove(&team_id).is_some())
    }
}

#[async_trait]
impl AccessGrantRepository for InMemoryTeamAccessRepository {
    async fn find_grant(
        &self,
        user_id: UserId,
        team_id: TeamId,
    ) -> AppResult<Option<AccessGrant>> {
        Ok(self
            .state
            .read()
            .await
            .grants
            .get(&(user_id, team_id))
            .cloned())
    }

    async fn list_grants_for_team(&self, team_id: TeamId) -> AppResult<Vec<AccessGrant>> {
        let mut grants = self.state.read().await.team_grants(team_id);
        grants.sort_by_key(|grant| (grant.level(), grant.user_id()));
        Ok(grants)
    }

    async fn grant_viewer_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        grantee: UserId,
    ) -> AppResult<AccessGrant> {
        let mut state = self.state.write().await;
        state.require_owner(team_id, owner)?;
        state.require_user(grantee)?;

        Ok(state
            .grants
            .entry((grantee, team_id))
            .or_insert_with(|| AccessGrant::viewer(grantee, team_id))
            .clone())
    }

    async fn revoke_viewer_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        user_id: UserId,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.require_owner(team_id, owner)?;

        match state.grants.get(&(user_id, team_id)) {
            None => Ok(false),
            Some(grant) if grant.is_owner() => Err(AppError::Conflict(format!(
                "owner grant of user '{user_id}' on team '{team_id}' cannot be revoked; transfer ownership instead"
            ))),
            Some(_) => Ok(state.grants.remove(&(user_id, team_id)).is_some()),
        }
    }

    async fn transfer_ownership_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        new_owner: UserId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_owner(team_id, owner)?;
        state.require_user(new_owner)?;

        if let Some(previous) = state.grants.get_mut(&(owner, team_id)) {
            *previous = previous.with_level(AccessLevel::Viewer);
        }

        state
            .grants
            .entry((new_owner, team_id))
            .and_modify(|grant| *grant = grant.with_level(AccessLevel::Owner))
            .or_insert_with(|| AccessGrant::owner(new_owner, team_id));
        Ok(())
    }

    async fn apply_membership_changes_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        changes: &MembershipChanges,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_owner(team_id, owner)?;
        for user_id in &changes.added {
            state.require_user(*user_id)?;
        }

        let current = state.team_grants(team_id);
        let next = apply_membership_changes(&current, team_id, changes);

        state
            .grants
            .retain(|(_, grant_team_id), _| *grant_team_id != team_id);
        for grant in next {
            state
                .grants
                .entry((grant.user_id(), team_id))
                .or_insert(grant);
        }

        Ok(())
    }
}
