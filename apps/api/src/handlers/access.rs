use std::collections::BTreeSet;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use staffdesk_core::UserIdentity;
use staffdesk_domain::{TeamId, UserId};
use uuid::Uuid;

use crate::dto::{
    AccessGrantResponse, GrantAccessRequest, MembershipChangesResponse, TeamAccessCheckResponse,
    TransferOwnershipRequest, UpdateTeamMembersRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{actor_id, parse_user_id};

pub async fn list_team_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AccessGrantResponse>>> {
    let grants = state
        .team_access_service
        .list_team_grants(actor_id(&user), TeamId::from_uuid(team_id))
        .await?
        .into_iter()
        .map(AccessGrantResponse::from)
        .collect();

    Ok(Json(grants))
}

pub async fn grant_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(team_id): Path<Uuid>,
    Json(payload): Json<GrantAccessRequest>,
) -> ApiResult<Json<AccessGrantResponse>> {
    let grantee = parse_user_id(payload.user_id.as_str())?;
    let grant = state
        .team_access_service
        .grant_access(TeamId::from_uuid(team_id), actor_id(&user), grantee)
        .await?;

    Ok(Json(AccessGrantResponse::from(grant)))
}

pub async fn revoke_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((team_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .team_access_service
        .revoke_access(
            TeamId::from_uuid(team_id),
            actor_id(&user),
            UserId::from_uuid(user_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_team_members_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(team_id): Path<Uuid>,
    Json(payload): Json<UpdateTeamMembersRequest>,
) -> ApiResult<Json<MembershipChangesResponse>> {
    let desired_users = payload
        .user_ids
        .iter()
        .map(|value| parse_user_id(value.as_str()))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let changes = state
        .team_access_service
        .update_team_users(actor_id(&user), TeamId::from_uuid(team_id), &desired_users)
        .await?;

    Ok(Json(MembershipChangesResponse::from(changes)))
}

pub async fn transfer_ownership_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(team_id): Path<Uuid>,
    Json(payload): Json<TransferOwnershipRequest>,
) -> ApiResult<StatusCode> {
    let new_owner = parse_user_id(payload.user_id.as_str())?;
    state
        .team_access_service
        .transfer_ownership(TeamId::from_uuid(team_id), actor_id(&user), new_owner)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_team_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<TeamAccessCheckResponse>> {
    let actor = actor_id(&user);
    let team_id = TeamId::from_uuid(team_id);
    let has_access = state.team_access_service.has_access(actor, team_id).await?;
    let is_owner = state
        .team_access_service
        .has_owner_access(actor, team_id)
        .await?;

    Ok(Json(TeamAccessCheckResponse {
        has_access,
        is_owner,
    }))
}
