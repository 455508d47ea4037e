use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use staffdesk_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

mod cors;

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/me", get(handlers::me::me_handler))
        .route(
            "/api/teams",
            get(handlers::teams::list_teams_handler).post(handlers::teams::create_team_handler),
        )
        .route(
            "/api/teams/{team_id}",
            get(handlers::teams::get_team_handler)
                .put(handlers::teams::rename_team_handler)
                .delete(handlers::teams::delete_team_handler),
        )
        .route(
            "/api/teams/{team_id}/access",
            get(handlers::access::list_team_access_handler)
                .post(handlers::access::grant_access_handler),
        )
        .route(
            "/api/teams/{team_id}/access/me",
            get(handlers::access::my_team_access_handler),
        )
        .route(
            "/api/teams/{team_id}/access/{user_id}",
            delete(handlers::access::revoke_access_handler),
        )
        .route(
            "/api/teams/{team_id}/members",
            put(handlers::access::update_team_members_handler),
        )
        .route(
            "/api/teams/{team_id}/ownership",
            post(handlers::access::transfer_ownership_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
