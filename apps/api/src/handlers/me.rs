use axum::Json;
use axum::extract::Extension;
use staffdesk_core::UserIdentity;

use crate::dto::UserIdentityResponse;

pub async fn me_handler(Extension(user): Extension<UserIdentity>) -> Json<UserIdentityResponse> {
    Json(UserIdentityResponse::from(user))
}
