use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::modules::storage::FileRecord;

/// Upload form for the uploads step.
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFilesDto {
    /// Supporting documents (PDF, DOCX); repeat the field for several files
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub documents: Vec<String>,
    /// Photos (JPG, PNG); repeat the field for several files
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub photos: Vec<String>,
}

/// Stored file metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    /// Original filename as uploaded
    pub filename: String,
    /// MIME type of the file
    pub filetype: String,
    /// Size of the file in bytes
    pub file_size: i64,
    pub user_id: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponseDto {
    fn from(f: FileRecord) -> Self {
        Self {
            id: f.id,
            filename: f.filename,
            filetype: f.filetype,
            file_size: f.file_size,
            user_id: f.user_id,
            uploaded_at: f.uploaded_at,
        }
    }
}

/// Query for listing stored files
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct FileListQuery {
    /// User identifier the files are tagged with
    #[validate(custom(
        function = "crate::shared::validation::not_blank",
        message = "user_id is required"
    ))]
    pub user_id: String,
}
