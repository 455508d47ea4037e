//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod team;
mod user;

pub use access::{
    AccessGrant, AccessGrantId, AccessLevel, MembershipChanges, apply_membership_changes,
    plan_membership_changes,
};
pub use team::{TEAM_NAME_MAX_LENGTH, Team, TeamId, TeamMembership};
pub use user::{LOGIN_MAX_LENGTH, Login, User, UserId};
