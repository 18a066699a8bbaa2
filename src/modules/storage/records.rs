use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// An uploaded file about to be stored
#[derive(Debug, Clone)]
pub struct NewFile {
    pub filename: String,
    pub filetype: String,
    pub user_id: String,
    pub data: Vec<u8>,
}

/// Stored file metadata; the binary payload is not loaded on listing
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    pub filename: String,
    pub filetype: String,
    pub file_size: i64,
    pub user_id: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A generated report about to be stored
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: String,
    pub report_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ReportRecord {
    pub id: Uuid,
    pub user_id: String,
    pub report_html: String,
    pub created_at: DateTime<Utc>,
}
