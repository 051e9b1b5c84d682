pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::render::handlers as export;
use crate::session::handlers as session;
use crate::state::AppState;

/// Upper bound for an uploaded resume file.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(session::handle_reset_session),
        )
        // Inputs
        .route(
            "/api/v1/sessions/:id/resume/upload",
            post(session::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            put(session::handle_put_resume_text),
        )
        .route(
            "/api/v1/sessions/:id/job-description",
            put(session::handle_put_job_description),
        )
        // Generation
        .route(
            "/api/v1/sessions/:id/analysis",
            post(session::handle_run_analysis),
        )
        .route(
            "/api/v1/sessions/:id/enhancement",
            post(session::handle_run_enhancement),
        )
        // Export
        .route(
            "/api/v1/sessions/:id/export/pdf",
            get(export::handle_export_pdf),
        )
        .route(
            "/api/v1/sessions/:id/export/tex",
            get(export::handle_export_tex),
        )
        .route(
            "/api/v1/sessions/:id/export/docx",
            get(export::handle_export_docx),
        )
        .with_state(state)
}
