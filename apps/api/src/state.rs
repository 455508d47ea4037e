use std::sync::Arc;

use sqlx::PgPool;
use staffdesk_application::{TeamAccessService, UserRepository};

use crate::auth::JwtVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub team_access_service: TeamAccessService,
    pub user_repository: Arc<dyn UserRepository>,
    pub jwt_verifier: Arc<JwtVerifier>,
    /// `None` when running against the in-memory adapter.
    pub postgres_pool: Option<PgPool>,
}
