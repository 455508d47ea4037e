use std::sync::Arc;

use sqlx::PgPool;
use staffdesk_application::{TeamAccessService, UserRepository};
use staffdesk_core::AppError;
use staffdesk_infrastructure::{
    PostgresAccessGrantRepository, PostgresTeamRepository, PostgresUserRepository,
};

use crate::api_config::ApiConfig;
use crate::auth::JwtVerifier;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(PostgresUserRepository::new(pool.clone()));
    let team_access_service = TeamAccessService::new(
        user_repository.clone(),
        Arc::new(PostgresTeamRepository::new(pool.clone())),
        Arc::new(PostgresAccessGrantRepository::new(pool.clone())),
    );
    let jwt_verifier = JwtVerifier::new(config.jwt_secret.as_str(), config.jwt_issuer.clone())?;

    Ok(AppState {
        team_access_service,
        user_repository,
        jwt_verifier: Arc::new(jwt_verifier),
        postgres_pool: Some(pool),
    })
}
