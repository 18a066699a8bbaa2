use async_trait::async_trait;
use uuid::Uuid;

use super::records::{FileRecord, NewFile, NewReport, ReportRecord};
use crate::core::error::Result;

/// Storage for files and reports, keyed by generated id and queried by user id.
///
/// There are no update or delete operations and no coupling between the
/// two collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store an uploaded file and return its generated id
    async fn store_file(&self, file: NewFile) -> Result<Uuid>;

    /// Store a generated report and return the stored record
    async fn store_report(&self, report: NewReport) -> Result<ReportRecord>;

    /// All files tagged with `user_id`, oldest first
    async fn list_files_by_user(&self, user_id: &str) -> Result<Vec<FileRecord>>;

    /// All reports tagged with `user_id`, oldest first
    async fn list_reports_by_user(&self, user_id: &str) -> Result<Vec<ReportRecord>>;

    /// A single report, only if it is tagged with `user_id`
    async fn find_report(&self, user_id: &str, report_id: Uuid) -> Result<Option<ReportRecord>>;
}
