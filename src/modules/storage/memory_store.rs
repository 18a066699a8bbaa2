use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document_store::DocumentStore;
use super::records::{FileRecord, NewFile, NewReport, ReportRecord};
use crate::core::error::Result;

/// Process-local document store; contents are lost on restart.
///
/// Only file metadata is kept. Payloads are not readable through
/// `DocumentStore`, so they are dropped once the size is recorded.
#[derive(Default)]
pub struct MemoryDocumentStore {
    files: RwLock<Vec<FileRecord>>,
    reports: RwLock<Vec<ReportRecord>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn store_file(&self, file: NewFile) -> Result<Uuid> {
        let record = FileRecord {
            id: Uuid::new_v4(),
            filename: file.filename,
            filetype: file.filetype,
            file_size: file.data.len() as i64,
            user_id: file.user_id,
            uploaded_at: Utc::now(),
        };
        let id = record.id;
        self.files.write().await.push(record);
        Ok(id)
    }

    async fn store_report(&self, report: NewReport) -> Result<ReportRecord> {
        let record = ReportRecord {
            id: Uuid::now_v7(),
            user_id: report.user_id,
            report_html: report.report_html,
            created_at: Utc::now(),
        };
        self.reports.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_files_by_user(&self, user_id: &str) -> Result<Vec<FileRecord>> {
        Ok(self
            .files
            .read()
            .await
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_reports_by_user(&self, user_id: &str) -> Result<Vec<ReportRecord>> {
        Ok(self
            .reports
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_report(&self, user_id: &str, report_id: Uuid) -> Result<Option<ReportRecord>> {
        Ok(self
            .reports
            .read()
            .await
            .iter()
            .find(|r| r.id == report_id && r.user_id == user_id)
            .cloned())
    }
}
