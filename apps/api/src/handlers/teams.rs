use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use staffdesk_application::CreateTeamInput;
use staffdesk_core::UserIdentity;
use staffdesk_domain::TeamId;
use uuid::Uuid;

use crate::dto::{CreateTeamRequest, RenameTeamRequest, TeamMembershipResponse, TeamResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::actor_id;

pub async fn list_teams_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<TeamMembershipResponse>>> {
    let teams = state
        .team_access_service
        .list_teams(actor_id(&user))
        .await?
        .into_iter()
        .map(TeamMembershipResponse::from)
        .collect();

    Ok(Json(teams))
}

pub async fn create_team_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    let team = state
        .team_access_service
        .create_team(actor_id(&user), CreateTeamInput { name: payload.name })
        .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(team))))
}

pub async fn get_team_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<TeamResponse>> {
    let team = state
        .team_access_service
        .get_team(actor_id(&user), TeamId::from_uuid(team_id))
        .await?;

    Ok(Json(TeamResponse::from(team)))
}

pub async fn rename_team_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(team_id): Path<Uuid>,
    Json(payload): Json<RenameTeamRequest>,
) -> ApiResult<Json<TeamResponse>> {
    let team = state
        .team_access_service
        .rename_team(actor_id(&user), TeamId::from_uuid(team_id), payload.name)
        .await?;

    Ok(Json(TeamResponse::from(team)))
}

pub async fn delete_team_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .team_access_service
        .delete_team(actor_id(&user), TeamId::from_uuid(team_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
