use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted tailoring result.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub master_resume: String,
    pub job_posting: String,
    pub latex_source: String,
    /// "structured" | "freeform" | "fallback"
    pub pipeline_path: String,
    pub content_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List projection: everything except the large text columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeSummaryRow {
    pub id: Uuid,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub pipeline_path: String,
    pub content_score: f64,
    pub created_at: DateTime<Utc>,
}
