use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, state::AppState};

/// Routes keep the paths existing clients already call.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_cached))
        .route("/health", get(handlers::healthcheck))
        .route("/data", get(handlers::list_fresh))
        .route("/data/:id", get(handlers::get_record))
        .route("/newObject", post(handlers::create_record))
        .route("/data/toModify/:id", put(handlers::update_record))
        .route("/data/toDelete/:id", delete(handlers::delete_record))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
