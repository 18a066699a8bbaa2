use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::document_store::DocumentStore;
use super::records::{FileRecord, NewFile, NewReport, ReportRecord};
use crate::core::error::Result;

/// PostgreSQL-backed document store (`files` and `reports` tables)
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[tracing::instrument(skip(self, file), fields(db.table = "files", db.operation = "insert"))]
    async fn store_file(&self, file: NewFile) -> Result<Uuid> {
        let id = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            INSERT INTO files (id, filename, filetype, file_size, user_id, file_data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&file.filename)
        .bind(&file.filetype)
        .bind(file.data.len() as i64)
        .bind(&file.user_id)
        .bind(&file.data)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self, report), fields(db.table = "reports", db.operation = "insert"))]
    async fn store_report(&self, report: NewReport) -> Result<ReportRecord> {
        let record = sqlx::query_as::<Postgres, ReportRecord>(
            r#"
            INSERT INTO reports (id, user_id, report_html)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, report_html, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&report.user_id)
        .bind(&report.report_html)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn list_files_by_user(&self, user_id: &str) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            SELECT id, filename, filetype, file_size, user_id, uploaded_at
            FROM files
            WHERE user_id = $1
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    #[tracing::instrument(skip(self), fields(db.table = "reports", db.operation = "select"))]
    async fn list_reports_by_user(&self, user_id: &str) -> Result<Vec<ReportRecord>> {
        let reports = sqlx::query_as::<Postgres, ReportRecord>(
            r#"
            SELECT id, user_id, report_html, created_at
            FROM reports
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    #[tracing::instrument(skip(self), fields(db.table = "reports", db.operation = "select", db.record_id = %report_id))]
    async fn find_report(&self, user_id: &str, report_id: Uuid) -> Result<Option<ReportRecord>> {
        let report = sqlx::query_as::<Postgres, ReportRecord>(
            r#"
            SELECT id, user_id, report_html, created_at
            FROM reports
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(report_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }
}
