//! Document export: the stored LaTeX source as a `.tex` file, or a PDF from
//! the LaTeX compile service.
//!
//! The service is a separate process (`LATEX_SERVICE_URL`) exposing
//! `POST /compile/pdf` with `{ latex, name }` and replying with PDF bytes.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::state::AppState;
use crate::tailoring::store::get_resume;

const COMPILE_TIMEOUT_SECS: u64 = 60;
const PDF_CONTENT_TYPE: &str = "application/pdf";
const TEX_CONTENT_TYPE: &str = "application/x-tex";

#[derive(Debug, Serialize)]
struct CompileRequest<'a> {
    latex: &'a str,
    name: &'a str,
}

#[derive(Clone)]
pub struct CompileClient {
    client: Client,
    base_url: String,
}

impl CompileClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(COMPILE_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn compile_url(&self) -> String {
        format!("{}/compile/pdf", self.base_url)
    }

    /// Compiles `latex` and returns the PDF. Any transport failure or non-2xx
    /// reply is `AppError::Compile`.
    pub async fn compile_pdf(&self, latex: &str, name: &str) -> Result<Bytes, AppError> {
        let response = self
            .client
            .post(self.compile_url())
            .json(&CompileRequest { latex, name })
            .send()
            .await
            .map_err(|e| AppError::Compile(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Compile service returned {status}: {body}");
            return Err(AppError::Compile(format!("status {status}")));
        }

        let pdf = response
            .bytes()
            .await
            .map_err(|e| AppError::Compile(format!("reading body failed: {e}")))?;
        info!("Compiled {name}: {} bytes", pdf.len());
        Ok(pdf)
    }
}

/// File name stem for an export: company and title when known, else the id.
pub fn export_name(id: Uuid, company_name: Option<&str>, job_title: Option<&str>) -> String {
    let parts: Vec<String> = [company_name, job_title]
        .into_iter()
        .flatten()
        .map(|part| {
            part.split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
                .join("_")
        })
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        format!("resume_{id}")
    } else {
        format!("resume_{}", parts.join("_"))
    }
}

/// Download response: `body` served as `{name}.{extension}`.
fn attachment(name: &str, extension: &str, content_type: &str, body: impl Into<Bytes>) -> Response {
    let disposition = format!("attachment; filename=\"{name}.{extension}\"");
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body.into(),
    )
        .into_response()
}

async fn stored_resume(state: &AppState, id: Uuid) -> Result<ResumeRow, AppError> {
    get_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// POST /api/v1/resumes/:id/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let row = stored_resume(&state, id).await?;
    let name = export_name(id, row.company_name.as_deref(), row.job_title.as_deref());
    let pdf = state.compiler.compile_pdf(&row.latex_source, &name).await?;
    Ok(attachment(&name, "pdf", PDF_CONTENT_TYPE, pdf))
}

/// POST /api/v1/resumes/:id/export/latex
///
/// The stored source as is; no compile service involved.
pub async fn handle_export_latex(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let row = stored_resume(&state, id).await?;
    let name = export_name(id, row.company_name.as_deref(), row.job_title.as_deref());
    info!("Exporting {name}.tex ({} bytes)", row.latex_source.len());
    Ok(attachment(&name, "tex", TEX_CONTENT_TYPE, row.latex_source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_name_from_company_and_title() {
        let id = Uuid::nil();
        assert_eq!(
            export_name(id, Some("Acme, Inc."), Some("Senior Engineer")),
            "resume_Acme_Inc_Senior_Engineer"
        );
    }

    #[test]
    fn test_export_name_falls_back_to_id() {
        let id = Uuid::nil();
        assert_eq!(export_name(id, None, Some("  ")), format!("resume_{id}"));
    }

    #[test]
    fn test_compile_url_ignores_trailing_slash() {
        let client = CompileClient::new("http://localhost:8082/");
        assert_eq!(client.compile_url(), "http://localhost:8082/compile/pdf");
    }

    #[tokio::test]
    async fn test_tex_attachment_headers_and_body() {
        let source = "\\documentclass{article}";
        let response = attachment("resume_Acme", "tex", TEX_CONTENT_TYPE, source.to_string());
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/x-tex");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume_Acme.tex\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], source.as_bytes());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_compile_error() {
        // Port 9 (discard) is not an HTTP server.
        let client = CompileClient::new("http://127.0.0.1:9");
        let result = client.compile_pdf("\\documentclass{article}", "x").await;
        assert!(matches!(result, Err(AppError::Compile(_))));
    }
}
