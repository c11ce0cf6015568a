use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Release date counts
        .route("/cantidad_filmaciones_mes/:mes", get(handlers::month_count))
        .route("/cantidad_filmaciones_dia/:dia", get(handlers::weekday_count))
        // Title lookups
        .route("/score_titulo/:titulo", get(handlers::score))
        .route("/votos_titulo/:titulo", get(handlers::votes))
        // People
        .route("/get_actor/:nombre", get(handlers::actor))
        .route("/get_director/:nombre", get(handlers::director))
        // Recommendations
        .route("/recomendacion/:titulo", get(handlers::recommend))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
