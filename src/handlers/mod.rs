pub mod analyze;
pub mod analyze_movie;
pub mod responses;

use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router() -> Router {
    Router::new()
        .route("/api/analyze", post(analyze::analyze))
        .route("/api/analyze-movie", post(analyze_movie::analyze_movie))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
