pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::export::{handle_export_latex, handle_export_pdf};
use crate::state::AppState;
use crate::tailoring::handlers;
use crate::tailoring::ingest::MAX_UPLOAD_BYTES;

/// Headroom over the upload cap for multipart framing.
const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document API
        .route("/api/v1/latex/template", get(handlers::handle_get_template))
        .route("/api/v1/latex/build", post(handlers::handle_build))
        .route("/api/v1/latex/recover", post(handlers::handle_recover))
        // Resume API
        .route("/api/v1/resumes", get(handlers::handle_list_resumes))
        .route("/api/v1/resumes/tailor", post(handlers::handle_tailor))
        .route(
            "/api/v1/resumes/analyze-job",
            post(handlers::handle_analyze_job),
        )
        .route(
            "/api/v1/resumes/extract-text",
            post(handlers::handle_extract_text),
        )
        .route(
            "/api/v1/resumes/:id",
            get(handlers::handle_get_resume)
                .put(handlers::handle_update_resume)
                .delete(handlers::handle_delete_resume),
        )
        .route("/api/v1/resumes/:id/export/pdf", post(handle_export_pdf))
        .route("/api/v1/resumes/:id/export/latex", post(handle_export_latex))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}
