use std::collections::BTreeSet;
use std::sync::Arc;

use staffdesk_core::{AppError, AppResult};
use staffdesk_domain::{
    AccessGrant, AccessLevel, MembershipChanges, Team, TeamId, TeamMembership, User, UserId,
    plan_membership_changes,
};

use crate::team_access_ports::{
    AccessGrantRepository, CreateTeamInput, TeamRepository, UserRepository,
};

mod checks;
mod membership;
mod sharing;
mod teams;

/// Application service mediating user access to teams.
///
/// Only owners may extend, revoke or reconcile access. Deleting a team
/// removes every grant attached to it.
#[derive(Clone)]
pub struct TeamAccessService {
    user_repository: Arc<dyn UserRepository>,
    team_repository: Arc<dyn TeamRepository>,
    access_grant_repository: Arc<dyn AccessGrantRepository>,
}

impl TeamAccessService {
    /// Creates a new team access service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        team_repository: Arc<dyn TeamRepository>,
        access_grant_repository: Arc<dyn AccessGrantRepository>,
    ) -> Self {
        Self {
            user_repository,
            team_repository,
            access_grant_repository,
        }
    }
}
