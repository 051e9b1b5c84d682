use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{DOCX_MEDIA_TYPE, PDF_MEDIA_TYPE};
use crate::models::resume::ResumeRecord;
use crate::render::docx::render_docx;
use crate::render::latex::{render_latex, LatexTemplate};
use crate::render::pdf::render_pdf;
use crate::render::RenderError;
use crate::session::handlers::load;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TexQuery {
    #[serde(default)]
    pub template: Option<String>,
}

/// GET /api/v1/sessions/:id/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let resume = enhanced_resume(&state, id).await?;
    let bytes = render_blocking(resume, |r| render_pdf(&r)).await?;
    info!(session_id = %id, size = bytes.len(), "PDF exported");
    Ok(attachment(PDF_MEDIA_TYPE, "resume.pdf", bytes))
}

/// GET /api/v1/sessions/:id/export/tex?template=Classic
pub async fn handle_export_tex(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TexQuery>,
) -> Result<Response, AppError> {
    let template = match query.template.as_deref() {
        Some(name) => name
            .parse::<LatexTemplate>()
            .map_err(|e| AppError::Validation(e.to_string()))?,
        None => LatexTemplate::default(),
    };
    let resume = enhanced_resume(&state, id).await?;
    let tex = render_latex(template, &resume);
    info!(session_id = %id, template = %template, "LaTeX exported");
    Ok(attachment("text/plain; charset=utf-8", "resume.tex", tex.into_bytes()))
}

/// GET /api/v1/sessions/:id/export/docx
pub async fn handle_export_docx(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let resume = enhanced_resume(&state, id).await?;
    let bytes = render_blocking(resume, |r| render_docx(&r)).await?;
    info!(session_id = %id, size = bytes.len(), "Word document exported");
    Ok(attachment(DOCX_MEDIA_TYPE, "resume.docx", bytes))
}

async fn enhanced_resume(state: &AppState, id: Uuid) -> Result<ResumeRecord, AppError> {
    load(state, id).await?.resume.ok_or_else(|| {
        AppError::Conflict("No enhanced resume yet. Run an enhancement first".to_string())
    })
}

async fn render_blocking<F>(resume: ResumeRecord, render: F) -> Result<Vec<u8>, AppError>
where
    F: FnOnce(ResumeRecord) -> Result<Vec<u8>, RenderError> + Send + 'static,
{
    let bytes = tokio::task::spawn_blocking(move || render(resume))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;
    Ok(bytes)
}

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
