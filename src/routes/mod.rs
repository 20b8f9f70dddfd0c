pub mod candidate_routes;
pub mod health;
pub mod interview;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Assembles the full application router; shared by `main` and the
/// integration tests.
pub fn app_router(state: AppState, rps: u32) -> Router {
    let api = Router::new()
        .route("/upload-resume", post(upload::upload_resume))
        .route("/start-interview", post(interview::start_interview))
        .route("/submit-answer", post(interview::submit_answer))
        .route("/finish-interview", post(interview::finish_interview))
        .route("/pause-interview", post(interview::pause_interview))
        .route("/resume-interview", post(interview::resume_interview))
        .route("/discard-interview", post(interview::discard_interview))
        .route("/update-candidate", post(interview::update_candidate))
        .route("/generate-options", post(interview::generate_options))
        .route("/candidates", get(candidate_routes::list_candidates))
        .route("/candidates/:id", get(candidate_routes::get_candidate))
        .layer(axum::middleware::from_fn_with_state(
            crate::middleware::rate_limit::RpsLimit::new(rps),
            crate::middleware::rate_limit::limit_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
}
