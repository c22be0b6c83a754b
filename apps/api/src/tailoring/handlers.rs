use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::latex::recovery::{recover_with_strategy, BoundaryStrategy};
use crate::latex::{build, fallback_document, template};
use crate::models::resume::{ResumeRow, ResumeSummaryRow};
use crate::state::AppState;
use crate::tailoring::analysis::{analyze_job, AnalyzeJobRequest, JobAnalysis};
use crate::tailoring::content::ResumeContent;
use crate::tailoring::ingest::{extract_text, MAX_UPLOAD_BYTES};
use crate::tailoring::orchestrator::{tailor, PipelinePath, TailorRequest};
use crate::tailoring::scoring::ContentScore;
use crate::tailoring::store::{
    delete_resume, get_resume, insert_resume, list_resumes, update_resume,
};

// ────────────────────────────────────────────────────────────────────────────
// Document endpoints (no generator involved)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TemplateResponse {
    pub template: &'static str,
}

#[derive(Serialize)]
pub struct LatexResponse {
    pub latex: String,
}

#[derive(Deserialize)]
pub struct RecoverRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct RecoverResponse {
    pub latex: String,
    /// `None` when the fallback document was substituted.
    pub strategy: Option<BoundaryStrategy>,
    pub recovered: bool,
}

/// GET /api/v1/latex/template
pub async fn handle_get_template() -> Json<TemplateResponse> {
    Json(TemplateResponse {
        template: template(),
    })
}

/// POST /api/v1/latex/build
pub async fn handle_build(Json(content): Json<ResumeContent>) -> Json<LatexResponse> {
    Json(LatexResponse {
        latex: build(Some(&content)),
    })
}

/// POST /api/v1/latex/recover
pub async fn handle_recover(Json(req): Json<RecoverRequest>) -> Json<RecoverResponse> {
    let response = match recover_with_strategy(&req.text) {
        Ok(recovered) => RecoverResponse {
            latex: recovered.latex,
            strategy: Some(recovered.strategy),
            recovered: true,
        },
        Err(e) => {
            warn!("Recovery failed, returning fallback document: {e}");
            RecoverResponse {
                latex: fallback_document(),
                strategy: None,
                recovered: false,
            }
        }
    };
    Json(response)
}

// ────────────────────────────────────────────────────────────────────────────
// Resume endpoints
// ────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TailorResponse {
    pub id: Uuid,
    pub latex: String,
    pub pipeline_path: PipelinePath,
    pub content_score: ContentScore,
}

#[derive(Serialize)]
pub struct ExtractTextResponse {
    pub filename: String,
    pub text: String,
}

/// POST /api/v1/resumes/tailor
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(req): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    let req = req.validated()?;
    let document = tailor(state.generator.as_ref(), &req).await;
    let row = insert_resume(&state.db, &req, &document).await?;

    Ok(Json(TailorResponse {
        id: row.id,
        latex: document.latex,
        pipeline_path: document.path,
        content_score: document.score,
    }))
}

/// PUT /api/v1/resumes/:id
///
/// Regenerates the document from a new request and replaces the stored row.
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    let req = req.validated()?;
    if get_resume(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }

    let document = tailor(state.generator.as_ref(), &req).await;
    let row = update_resume(&state.db, id, &req, &document)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    Ok(Json(TailorResponse {
        id: row.id,
        latex: document.latex,
        pipeline_path: document.path,
        content_score: document.score,
    }))
}

/// POST /api/v1/resumes/analyze-job
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeJobRequest>,
) -> Result<Json<JobAnalysis>, AppError> {
    let req = req.validated()?;
    Ok(Json(analyze_job(state.generator.as_ref(), &req).await))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeSummaryRow>>, AppError> {
    Ok(Json(list_resumes(&state.db).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let row = get_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(row))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !delete_resume(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    info!("Deleted resume {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/extract-text
///
/// Multipart upload with a single `file` field (.pdf or .txt).
pub async fn handle_extract_text(
    mut multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        if data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::Validation(format!(
                "File exceeds the {} MB upload limit",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }

        let name = filename.clone();
        let text = tokio::task::spawn_blocking(move || extract_text(&name, &data))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

        info!("Extracted text from upload {filename}: {} chars", text.len());
        return Ok(Json(ExtractTextResponse { filename, text }));
    }

    Err(AppError::Validation("Missing 'file' field".to_string()))
}
