mod access;
mod common;
mod teams;

pub use access::{
    AccessGrantResponse, GrantAccessRequest, MembershipChangesResponse, TeamAccessCheckResponse,
    TransferOwnershipRequest, UpdateTeamMembersRequest,
};
pub use common::{HealthDependencyStatus, HealthResponse, UserIdentityResponse};
pub use teams::{CreateTeamRequest, RenameTeamRequest, TeamMembershipResponse, TeamResponse};
