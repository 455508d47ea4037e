use serde::{Deserialize, Serialize};
use staffdesk_domain::{AccessGrant, MembershipChanges};
use ts_rs::TS;

/// Incoming payload for sharing a team with a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-access-request.ts"
)]
pub struct GrantAccessRequest {
    pub user_id: String,
}

/// API representation of an access grant.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-grant-response.ts"
)]
pub struct AccessGrantResponse {
    pub grant_id: String,
    pub user_id: String,
    pub team_id: String,
    pub access_level: String,
}

impl From<AccessGrant> for AccessGrantResponse {
    fn from(value: AccessGrant) -> Self {
        Self {
            grant_id: value.id().to_string(),
            user_id: value.user_id().to_string(),
            team_id: value.team_id().to_string(),
            access_level: value.level().as_str().to_owned(),
        }
    }
}

/// Desired set of users who should hold access to a team.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-team-members-request.ts"
)]
pub struct UpdateTeamMembersRequest {
    pub user_ids: Vec<String>,
}

/// Grants removed and added by a membership update.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/membership-changes-response.ts"
)]
pub struct MembershipChangesResponse {
    pub revoked: Vec<String>,
    pub added: Vec<String>,
}

impl From<MembershipChanges> for MembershipChangesResponse {
    fn from(value: MembershipChanges) -> Self {
        Self {
            revoked: value.revoked.iter().map(ToString::to_string).collect(),
            added: value.added.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Incoming payload for handing team ownership to another user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/transfer-ownership-request.ts"
)]
pub struct TransferOwnershipRequest {
    pub user_id: String,
}

/// Access the caller holds on one team.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/team-access-check-response.ts"
)]
pub struct TeamAccessCheckResponse {
    pub has_access: bool,
    pub is_owner: bool,
}
