use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use staffdesk_core::{AppError, UserIdentity};

use crate::auth::bearer_token;
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the bearer token into a [`UserIdentity`] request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let claims = state
        .jwt_verifier
        .verify(bearer_token(request.headers())?)?;

    let user = state
        .user_repository
        .find_user_by_login(claims.sub.as_str())
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown user".to_owned()))?;

    request.extensions_mut().insert(UserIdentity::new(
        user.id().as_uuid(),
        user.login().as_str(),
        user.display_name().as_str(),
    ));
    Ok(next.run(request).await)
}
