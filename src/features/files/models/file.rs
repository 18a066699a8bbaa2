use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Docx,
    Image,
}

impl FileKind {
    /// Detect the kind from the file extension, falling back to the MIME type
    pub fn detect(file_name: &str, content_type: &str) -> Option<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase());

        match extension.as_deref() {
            Some("pdf") => return Some(FileKind::Pdf),
            Some("docx") => return Some(FileKind::Docx),
            Some("jpg") | Some("jpeg") | Some("png") => return Some(FileKind::Image),
            _ => {}
        }

        match content_type {
            "application/pdf" => Some(FileKind::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(FileKind::Docx)
            }
            "image/jpeg" | "image/png" => Some(FileKind::Image),
            _ => None,
        }
    }

    /// Extension used for scratch copies
    pub fn default_extension(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Docx => "docx",
            FileKind::Image => "png",
        }
    }
}

/// A file received in the uploads step, held in the session until the report is generated
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn kind(&self) -> Option<FileKind> {
        FileKind::detect(&self.name, &self.content_type)
    }

    /// Extension of the original name, or the kind's default
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .or_else(|| self.kind().map(|k| k.default_extension().to_string()))
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Extraction output for one file: its text, or an error string in its place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedFile {
    pub name: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(FileKind::detect("report.PDF", ""), Some(FileKind::Pdf));
        assert_eq!(
            FileKind::detect("notes.docx", "application/octet-stream"),
            Some(FileKind::Docx)
        );
        assert_eq!(FileKind::detect("scene.jpeg", ""), Some(FileKind::Image));
        assert_eq!(FileKind::detect("scene.png", ""), Some(FileKind::Image));
    }

    #[test]
    fn test_detect_by_content_type() {
        assert_eq!(FileKind::detect("upload", "application/pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::detect("photo", "image/jpeg"), Some(FileKind::Image));
        assert_eq!(FileKind::detect("notes.txt", "text/plain"), None);
    }

    #[test]
    fn test_extension() {
        let file = UploadedFile {
            name: "Police Report.PDF".to_string(),
            content_type: "application/pdf".to_string(),
            data: Vec::new(),
        };
        assert_eq!(file.extension(), "pdf");

        let unnamed = UploadedFile {
            name: "unnamed".to_string(),
            content_type: "image/png".to_string(),
            data: Vec::new(),
        };
        assert_eq!(unnamed.extension(), "png");
    }
}
