use serde::{Deserialize, Serialize};
use staffdesk_domain::{Team, TeamMembership};
use ts_rs::TS;

/// Incoming payload for team creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-team-request.ts"
)]
pub struct CreateTeamRequest {
    pub name: String,
}

/// Incoming payload for renaming a team.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rename-team-request.ts"
)]
pub struct RenameTeamRequest {
    pub name: String,
}

/// API representation of a team.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/team-response.ts"
)]
pub struct TeamResponse {
    pub team_id: String,
    pub name: String,
}

impl From<Team> for TeamResponse {
    fn from(value: Team) -> Self {
        Self {
            team_id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
        }
    }
}

/// A team together with the caller's access level on it.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/team-membership-response.ts"
)]
pub struct TeamMembershipResponse {
    pub team_id: String,
    pub name: String,
    pub access_level: String,
}

impl From<TeamMembership> for TeamMembershipResponse {
    fn from(value: TeamMembership) -> Self {
        Self {
            team_id: value.team.id().to_string(),
            name: value.team.name().as_str().to_owned(),
            access_level: value.level.as_str().to_owned(),
        }
    }
}
