//! Team access grants and membership reconciliation.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use staffdesk_core::{AppError, AppResult};
use uuid::Uuid;

use crate::{TeamId, UserId};

/// Access level a user holds on a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// May read the team and extend access to others.
    Owner,
    /// May read the team only.
    Viewer,
}

impl AccessLevel {
    /// Returns a stable storage value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Viewer => "viewer",
        }
    }

    /// Returns whether this level allows owner-only writes such as sharing the team.
    #[must_use]
    pub fn can_share(&self) -> bool {
        matches!(self, Self::Owner)
    }

    /// Parses a transport value into an access level.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for AccessLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "owner" => Ok(Self::Owner),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::Validation(format!(
                "unknown access level '{value}'"
            ))),
        }
    }
}

/// Unique identifier for an access grant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessGrantId(Uuid);

impl AccessGrantId {
    /// Creates a new random grant identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a grant identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AccessGrantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccessGrantId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Authorization record linking one user to one team.
///
/// At most one grant exists per `(user_id, team_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    id: AccessGrantId,
    user_id: UserId,
    team_id: TeamId,
    level: AccessLevel,
}

impl AccessGrant {
    /// Creates a grant with a fresh identifier.
    #[must_use]
    pub fn new(user_id: UserId, team_id: TeamId, level: AccessLevel) -> Self {
        Self::from_parts(AccessGrantId::new(), user_id, team_id, level)
    }

    /// Rebuilds a grant from persisted parts.
    #[must_use]
    pub fn from_parts(
        id: AccessGrantId,
        user_id: UserId,
        team_id: TeamId,
        level: AccessLevel,
    ) -> Self {
        Self {
            id,
            user_id,
            team_id,
            level,
        }
    }

    /// Creates the owner grant for a team creator.
    #[must_use]
    pub fn owner(user_id: UserId, team_id: TeamId) -> Self {
        Self::new(user_id, team_id, AccessLevel::Owner)
    }

    /// Creates a read-only grant.
    #[must_use]
    pub fn viewer(user_id: UserId, team_id: TeamId) -> Self {
        Self::new(user_id, team_id, AccessLevel::Viewer)
    }

    /// Returns the grant identifier.
    #[must_use]
    pub fn id(&self) -> AccessGrantId {
        self.id
    }

    /// Returns the user holding this grant.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the team this grant applies to.
    #[must_use]
    pub fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the access level.
    #[must_use]
    pub fn level(&self) -> AccessLevel {
        self.level
    }

    /// Returns whether this is an owner grant.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.level == AccessLevel::Owner
    }

    /// Returns a copy of this grant with another level.
    #[must_use]
    pub fn with_level(&self, level: AccessLevel) -> Self {
        Self { level, ..*self }
    }
}

/// Grant changes required to reconcile a team with a desired user set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipChanges {
    /// Users whose viewer grant is removed.
    pub revoked: Vec<UserId>,
    /// Users who receive a new viewer grant.
    pub added: Vec<UserId>,
}

impl MembershipChanges {
    /// Returns whether applying these changes is a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty() && self.added.is_empty()
    }
}

/// Plans the grant changes that make `current` match `desired`.
///
/// Owner grants are never revoked, even when the owner is missing from
/// `desired`. Both output lists are sorted and free of duplicates.
#[must_use]
pub fn plan_membership_changes(
    current: &[AccessGrant],
    desired: &BTreeSet<UserId>,
) -> MembershipChanges {
    let holders: BTreeSet<UserId> = current.iter().map(AccessGrant::user_id).collect();

    let revoked = current
        .iter()
        .filter(|grant| !grant.is_owner() && !desired.contains(&grant.user_id()))
        .map(AccessGrant::user_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let added = desired
        .iter()
        .filter(|user_id| !holders.contains(user_id))
        .copied()
        .collect();

    MembershipChanges { revoked, added }
}

/// Applies planned changes to an in-memory grant list.
///
/// Used by adapters that reconcile without a database and by tests that
/// check reconciliation properties.
#[must_use]
pub fn apply_membership_changes(
    current: &[AccessGrant],
    team_id: TeamId,
    changes: &MembershipChanges,
) -> Vec<AccessGrant> {
    let revoked: BTreeSet<UserId> = changes.revoked.iter().copied().collect();
    let mut grants: Vec<AccessGrant> = current
        .iter()
        .filter(|grant| grant.is_owner() || !revoked.contains(&grant.user_id()))
        .cloned()
        .collect();

    grants.extend(
        changes
            .added
            .iter()
            .map(|user_id| AccessGrant::viewer(*user_id, team_id)),
    );

    grants
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::*;

    fn holders(grants: &[AccessGrant]) -> BTreeSet<(UserId, AccessLevel)> {
        grants
            .iter()
            .map(|grant| (grant.user_id(), grant.level()))
            .collect::<BTreeSet<_>>()
    }

    #[test]
    fn access_level_storage_value_parses_back() {
        let restored = AccessLevel::from_str(AccessLevel::Viewer.as_str());
        assert_eq!(restored.ok(), Some(AccessLevel::Viewer));
    }

    #[test]
    fn unknown_access_level_is_rejected() {
        assert!(AccessLevel::from_transport("admin").is_err());
    }

    #[test]
    fn only_owner_can_share() {
        assert!(AccessLevel::Owner.can_share());
        assert!(!AccessLevel::Viewer.can_share());
    }

    #[test]
    fn reconciliation_keeps_owner_missing_from_desired_set() {
        let team_id = TeamId::new();
        let owner = UserId::new();
        let viewer = UserId::new();
        let current = vec![
            AccessGrant::owner(owner, team_id),
            AccessGrant::viewer(viewer, team_id),
        ];

        let changes = plan_membership_changes(&current, &BTreeSet::new());

        assert_eq!(changes.revoked, vec![viewer]);
        assert!(changes.added.is_empty());
    }

    #[test]
    fn reconciliation_adds_missing_users_as_viewers() {
        let team_id = TeamId::new();
        let owner = UserId::new();
        let newcomer = UserId::new();
        let current = vec![AccessGrant::owner(owner, team_id)];
        let desired = BTreeSet::from([owner, newcomer]);

        let changes = plan_membership_changes(&current, &desired);
        let next = apply_membership_changes(&current, team_id, &changes);

        assert_eq!(changes.added, vec![newcomer]);
        assert!(
            next.iter()
                .any(|grant| grant.user_id() == newcomer && grant.level() == AccessLevel::Viewer)
        );
    }

    prop_compose! {
        fn grants_and_desired()(
            owner_count in 1usize..3,
            viewer_count in 0usize..6,
            desired_mask in proptest::collection::vec(any::<bool>(), 8),
            extra_count in 0usize..4,
        ) -> (TeamId, Vec<AccessGrant>, BTreeSet<UserId>) {
            let team_id = TeamId::new();
            let mut grants = Vec::new();
            for _ in 0..owner_count {
                grants.push(AccessGrant::owner(UserId::new(), team_id));
            }
            for _ in 0..viewer_count {
                grants.push(AccessGrant::viewer(UserId::new(), team_id));
            }

            let mut desired: BTreeSet<UserId> = grants
                .iter()
                .zip(desired_mask.iter())
                .filter_map(|(grant, keep)| keep.then_some(grant.user_id()))
                .collect();
            for _ in 0..extra_count {
                desired.insert(UserId::new());
            }

            (team_id, grants, desired)
        }
    }

    proptest! {
        #[test]
        fn reconciliation_is_idempotent((team_id, grants, desired) in grants_and_desired()) {
            let first = apply_membership_changes(
                &grants,
                team_id,
                &plan_membership_changes(&grants, &desired),
            );
            let second_changes = plan_membership_changes(&first, &desired);
            let second = apply_membership_changes(&first, team_id, &second_changes);

            prop_assert!(second_changes.is_empty());
            prop_assert_eq!(holders(&first), holders(&second));
        }

        #[test]
        fn reconciliation_never_drops_owners((team_id, grants, desired) in grants_and_desired()) {
            let next = apply_membership_changes(
                &grants,
                team_id,
                &plan_membership_changes(&grants, &desired),
            );

            for owner in grants.iter().filter(|grant| grant.is_owner()) {
                let kept = next
                    .iter()
                    .any(|grant| grant.user_id() == owner.user_id() && grant.is_owner());
                prop_assert!(kept);
            }
        }

        #[test]
        fn reconciled_holders_match_desired_plus_owners(
            (team_id, grants, desired) in grants_and_desired()
        ) {
            let next = apply_membership_changes(
                &grants,
                team_id,
                &plan_membership_changes(&grants, &desired),
            );

            let expected: BTreeSet<UserId> = desired
                .iter()
                .copied()
                .chain(grants.iter().filter(|grant| grant.is_owner()).map(AccessGrant::user_id))
                .collect();
            let actual: BTreeSet<UserId> = next.iter().map(AccessGrant::user_id).collect();

            prop_assert_eq!(actual, expected);
        }
    }
}
