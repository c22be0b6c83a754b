use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{ResumeRow, ResumeSummaryRow};
use crate::tailoring::orchestrator::{TailorRequest, TailoredDocument};

/// Maximum rows returned by `list_resumes`.
pub const LIST_LIMIT: i64 = 50;

/// Persists a tailoring result. Only the document text and its score are
/// stored; the structured content is not.
pub async fn insert_resume(
    pool: &PgPool,
    request: &TailorRequest,
    document: &TailoredDocument,
) -> Result<ResumeRow, sqlx::Error> {
    let row: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes
            (id, job_title, company_name, master_resume, job_posting,
             latex_source, pipeline_path, content_score)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.job_title.as_deref())
    .bind(request.company_name.as_deref())
    .bind(&request.master_resume)
    .bind(&request.job_posting)
    .bind(&document.latex)
    .bind(document.path.as_str())
    .bind(document.score.overall)
    .fetch_one(pool)
    .await?;

    info!("Stored resume {} (path={})", row.id, row.pipeline_path);
    Ok(row)
}

/// Replaces a stored resume with a regenerated one. `None` when no row had that id.
pub async fn update_resume(
    pool: &PgPool,
    id: Uuid,
    request: &TailorRequest,
    document: &TailoredDocument,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    let row: Option<ResumeRow> = sqlx::query_as(
        r#"
        UPDATE resumes
        SET job_title = $2, company_name = $3, master_resume = $4, job_posting = $5,
            latex_source = $6, pipeline_path = $7, content_score = $8, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(request.job_title.as_deref())
    .bind(request.company_name.as_deref())
    .bind(&request.master_resume)
    .bind(&request.job_posting)
    .bind(&document.latex)
    .bind(document.path.as_str())
    .bind(document.score.overall)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = &row {
        info!("Updated resume {} (path={})", row.id, row.pipeline_path);
    }
    Ok(row)
}

pub async fn get_resume(pool: &PgPool, id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Most recent first.
pub async fn list_resumes(pool: &PgPool) -> Result<Vec<ResumeSummaryRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, job_title, company_name, pipeline_path, content_score, created_at
        FROM resumes
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
}

/// Returns `false` when no row had that id.
pub async fn delete_resume(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
