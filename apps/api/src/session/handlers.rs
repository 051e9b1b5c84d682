use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{extract_text_blocking, DOCX_MEDIA_TYPE, PDF_MEDIA_TYPE};
use crate::generation::ats_scoring::score_resume;
use crate::generation::rewriter::enhance_resume;
use crate::llm_client::PreferredModel;
use crate::models::analysis::AnalysisRecord;
use crate::models::resume::ResumeRecord;
use crate::session::{Session, SessionView};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub model: Option<PreferredModel>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub model: PreferredModel,
    pub has_credential: bool,
}

#[derive(Debug, Deserialize)]
pub struct TextInput {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractedResume {
    pub text: String,
    pub chars: usize,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let credential = req
        .credential
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .or_else(|| state.config.gemini_api_key.clone());
    let model = req.model.unwrap_or(state.config.default_model);

    let session = state.sessions.create(credential, model).await;
    info!(session_id = %session.id, model = %model, "Session created");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
            model: session.model,
            has_credential: session.credential.is_some(),
        }),
    ))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = load(&state, id).await?;
    Ok(Json(session.view()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(AppError::session_not_found(id));
    }
    info!(session_id = %id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .update(id, |s| {
            s.reset();
            s.view()
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/resume/upload
///
/// Extraction never fails the request: unreadable files come back as an
/// "Error parsing file: ..." line and unsupported types as empty text.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ExtractedResume>, AppError> {
    load(&state, id).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let media_type = media_type_for(field.content_type(), field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        upload = Some((bytes, media_type));
        break;
    }
    let (bytes, media_type) = upload.ok_or_else(|| {
        AppError::Validation(format!("Multipart field '{UPLOAD_FIELD}' is required"))
    })?;

    info!(session_id = %id, media_type = %media_type, size = bytes.len(), "Resume uploaded");
    let text = extract_text_blocking(bytes, media_type).await;

    let stored = text.clone();
    state
        .sessions
        .update(id, move |s| s.set_resume_text(stored))
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;

    Ok(Json(ExtractedResume {
        chars: text.chars().count(),
        text,
    }))
}

/// PUT /api/v1/sessions/:id/resume
pub async fn handle_put_resume_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TextInput>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .update(id, |s| {
            s.set_resume_text(input.text);
            s.view()
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}

/// PUT /api/v1/sessions/:id/job-description
pub async fn handle_put_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TextInput>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .update(id, |s| {
            s.set_job_description(input.text);
            s.view()
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/analysis
pub async fn handle_run_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let session = load(&state, id).await?;
    let credential = ready_credential(&session)?;

    let analysis = score_resume(
        state.generator.as_ref(),
        &session.resume_text,
        &session.job_description,
        credential,
        session.model.as_str(),
    )
    .await?;

    let stored = analysis.clone();
    state
        .sessions
        .update(id, |s| {
            if same_inputs(s, &session) {
                s.analysis = Some(stored);
            }
        })
        .await;

    Ok(Json(analysis))
}

/// POST /api/v1/sessions/:id/enhancement
pub async fn handle_run_enhancement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRecord>, AppError> {
    let session = load(&state, id).await?;
    let credential = ready_credential(&session)?;

    let resume = enhance_resume(
        state.generator.as_ref(),
        &session.resume_text,
        &session.job_description,
        credential,
        session.model.as_str(),
    )
    .await?;

    let stored = resume.clone();
    state
        .sessions
        .update(id, |s| {
            if same_inputs(s, &session) {
                s.resume = Some(stored);
            }
        })
        .await;

    Ok(Json(resume))
}

pub(crate) async fn load(state: &AppState, id: Uuid) -> Result<Session, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::session_not_found(id))
}

/// Both inputs must be present before any model call, and a credential must be set.
fn ready_credential(session: &Session) -> Result<&str, AppError> {
    if !session.has_inputs() {
        return Err(AppError::Validation(
            "Resume text and job description are both required".to_string(),
        ));
    }
    session
        .credential
        .as_deref()
        .ok_or_else(|| AppError::Validation("No Key".to_string()))
}

/// Results are only kept if the inputs did not change while the model was working.
fn same_inputs(current: &Session, used: &Session) -> bool {
    current.resume_text == used.resume_text && current.job_description == used.job_description
}

/// Declared content type, or a guess from the file extension when the client
/// sent none (or a generic one).
fn media_type_for(content_type: Option<&str>, file_name: Option<&str>) -> String {
    match content_type {
        Some(ct) if !ct.trim().is_empty() && ct != "application/octet-stream" => ct.to_string(),
        _ => {
            let ext = file_name
                .and_then(|n| n.rsplit_once('.'))
                .map(|(_, ext)| ext.to_ascii_lowercase());
            match ext.as_deref() {
                Some("pdf") => PDF_MEDIA_TYPE.to_string(),
                Some("docx") => DOCX_MEDIA_TYPE.to_string(),
                _ => content_type.unwrap_or_default().to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_prefers_declared_type() {
        assert_eq!(
            media_type_for(Some("application/pdf"), Some("cv.docx")),
            "application/pdf"
        );
    }

    #[test]
    fn test_media_type_falls_back_to_extension() {
        assert_eq!(media_type_for(None, Some("CV.PDF")), PDF_MEDIA_TYPE);
        assert_eq!(
            media_type_for(Some("application/octet-stream"), Some("cv.docx")),
            DOCX_MEDIA_TYPE
        );
        assert_eq!(media_type_for(None, Some("notes.txt")), "");
        assert_eq!(media_type_for(None, None), "");
    }

    #[test]
    fn test_ready_credential_checks_inputs_before_key() {
        let mut session = Session::new(None, PreferredModel::default());
        let err = ready_credential(&session).unwrap_err();
        assert!(err.to_string().contains("both required"));

        session.resume_text = "resume".to_string();
        session.job_description = "jd".to_string();
        let err = ready_credential(&session).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: No Key");

        session.credential = Some("key".to_string());
        assert_eq!(ready_credential(&session).unwrap(), "key");
    }
}
