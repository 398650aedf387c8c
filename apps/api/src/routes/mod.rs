pub mod health;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::applications::handlers;
use crate::auth::resolve_caller;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let applications = Router::new()
        .route(
            "/api/applications",
            get(handlers::handle_list_mine).post(handlers::handle_submit),
        )
        .route("/api/applications/all", get(handlers::handle_list_all))
        .route("/api/applications/:id", put(handlers::handle_update_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), resolve_caller));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(applications)
        .with_state(state)
}
