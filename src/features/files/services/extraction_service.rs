use lazy_static::lazy_static;
use regex::Regex;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::core::config::ExtractionConfig;
use crate::features::files::models::{ExtractedFile, FileKind, UploadedFile};
use crate::shared::tokenizer::Tokenizer;
use crate::shared::validation::normalize_whitespace;

lazy_static! {
    /// Text runs, paragraph ends, tabs and breaks in `word/document.xml`
    static ref DOCX_TOKEN: Regex =
        Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|</w:p>|<w:tab/>|<w:br/>").unwrap();
}

#[derive(Debug, Error)]
enum ExtractionError {
    #[error("unsupported file type")]
    Unsupported,

    #[error("{0}")]
    Pdf(String),

    #[error("{0}")]
    Docx(String),

    #[error("{0}")]
    Ocr(String),

    #[error("no extractable text")]
    Empty,

    #[error("extraction aborted: {0}")]
    Aborted(String),
}

/// Converts uploaded documents and photos into plain text for the prompt
pub struct ExtractionService {
    tokenizer: Arc<Tokenizer>,
    config: ExtractionConfig,
}

impl ExtractionService {
    pub fn new(tokenizer: Arc<Tokenizer>, config: ExtractionConfig) -> Self {
        Self { tokenizer, config }
    }

    /// Extract every file in order.
    ///
    /// Never fails: a file that cannot be read gets an error string as its
    /// content. Files are processed one at a time and each scratch copy is
    /// removed before the next file starts.
    pub async fn extract_all(&self, files: &[UploadedFile]) -> Vec<ExtractedFile> {
        let mut extracted = Vec::with_capacity(files.len());
        for file in files {
            extracted.push(self.extract_one(file).await);
        }
        extracted
    }

    /// Apply the extraction token policy to free text such as the narrative
    pub fn cap_text(&self, text: &str) -> String {
        self.tokenizer.apply(self.config.token_policy, text)
    }

    async fn extract_one(&self, file: &UploadedFile) -> ExtractedFile {
        let scratch = match self.write_scratch(file) {
            Ok(scratch) => scratch,
            Err(e) => {
                tracing::warn!(file = %file.name, "Failed to write scratch copy: {}", e);
                return ExtractedFile {
                    name: file.name.clone(),
                    content: format!("Error processing file: {}", e),
                };
            }
        };

        let result = self.run_extraction(file.kind(), scratch.path()).await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::warn!("Failed to remove scratch file {}: {}", scratch_path.display(), e);
        }

        let content = match result {
            Ok(text) => {
                let content = self.cap_text(&text);
                tracing::debug!(
                    file = %file.name,
                    chars = text.len(),
                    tokens = self.tokenizer.count_tokens(&content),
                    "Text extracted"
                );
                content
            }
            Err(e) => {
                tracing::warn!(file = %file.name, "Extraction failed: {}", e);
                format!("Error extracting content: {}", e)
            }
        };

        ExtractedFile {
            name: file.name.clone(),
            content,
        }
    }

    fn write_scratch(&self, file: &UploadedFile) -> std::io::Result<NamedTempFile> {
        let suffix = format!(".{}", file.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix("upload-").suffix(&suffix);

        let mut scratch = match &self.config.scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        scratch.write_all(&file.data)?;
        scratch.flush()?;
        Ok(scratch)
    }

    async fn run_extraction(
        &self,
        kind: Option<FileKind>,
        path: &Path,
    ) -> Result<String, ExtractionError> {
        let text = match kind {
            Some(FileKind::Pdf) => {
                let path = path.to_path_buf();
                run_blocking(move || extract_pdf_text(&path)).await?
            }
            Some(FileKind::Docx) => {
                let path = path.to_path_buf();
                run_blocking(move || extract_docx_text(&path)).await?
            }
            Some(FileKind::Image) => self.extract_image_text(path).await?,
            None => return Err(ExtractionError::Unsupported),
        };

        let text = normalize_whitespace(&text);
        if text.is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(text)
    }

    /// OCR through the tesseract CLI; the child is killed on timeout or cancellation
    async fn extract_image_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let child = tokio::process::Command::new(&self.config.tesseract_bin)
            .arg(path)
            .arg("stdout")
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.config.ocr_timeout, child)
            .await
            .map_err(|_| {
                ExtractionError::Ocr(format!(
                    "{} timed out after {:?}",
                    self.config.tesseract_bin, self.config.ocr_timeout
                ))
            })?
            .map_err(|e| {
                ExtractionError::Ocr(format!(
                    "failed to run {}: {}",
                    self.config.tesseract_bin, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "{} exited with {}: {}",
                self.config.tesseract_bin,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Run a CPU-bound extractor off the async workers; panics become errors
async fn run_blocking<F>(f: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ExtractionError::Aborted(e.to_string()))?
}

fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    pdf_extract::extract_text(path).map_err(|e| ExtractionError::Pdf(e.to_string()))
}

fn extract_docx_text(path: &Path) -> Result<String, ExtractionError> {
    let file = std::fs::File::open(path).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    Ok(docx_xml_to_text(&xml))
}

fn docx_xml_to_text(xml: &str) -> String {
    let mut text = String::new();
    for caps in DOCX_TOKEN.captures_iter(xml) {
        match caps.get(1) {
            Some(run) => text.push_str(&decode_xml_entities(run.as_str())),
            None => match &caps[0] {
                "</w:p>" | "<w:br/>" => text.push('\n'),
                _ => text.push('\t'),
            },
        }
    }
    text
}

fn decode_xml_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{docx_bytes, extraction_config, pdf_bytes};
    use crate::shared::tokenizer::TokenPolicy;

    fn service(scratch: &Path, policy: TokenPolicy) -> ExtractionService {
        ExtractionService::new(
            Arc::new(Tokenizer::new().unwrap()),
            extraction_config(scratch, policy),
        )
    }

    fn upload(name: &str, content_type: &str, data: Vec<u8>) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            content_type: content_type.to_string(),
            data,
        }
    }

    fn scratch_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_docx_xml_to_text() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Patient:</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve">Jane &amp; John</w:t></w:r></w:p>
            <w:tbl><w:tr><w:tc><w:p><w:r><w:t>ER visit</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
        </w:body></w:document>"#;

        assert_eq!(docx_xml_to_text(xml), "Patient:\tJane & John\nER visit\n");
    }

    #[tokio::test]
    async fn test_extracts_docx_and_removes_scratch() {
        let scratch = tempfile::tempdir().unwrap();
        let service = service(scratch.path(), TokenPolicy::Capped(1000));

        let files = vec![upload(
            "er_notes.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            docx_bytes(&["Diagnosed with cervical strain.", "Follow up in two weeks."]),
        )];

        let extracted = service.extract_all(&files).await;

        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].name, "er_notes.docx");
        assert_eq!(
            extracted[0].content,
            "Diagnosed with cervical strain.\nFollow up in two weeks."
        );
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_failures_become_error_strings_in_order() {
        let scratch = tempfile::tempdir().unwrap();
        let mut service = service(scratch.path(), TokenPolicy::Capped(1000));
        service.config.tesseract_bin = "definitely-not-an-ocr-binary".to_string();

        let files = vec![
            upload("broken.pdf", "application/pdf", b"not a pdf at all".to_vec()),
            upload("photo.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff]),
            upload("notes.txt", "text/plain", b"plain".to_vec()),
            upload("empty.docx", "", docx_bytes(&["   "])),
        ];

        let extracted = service.extract_all(&files).await;

        let names: Vec<&str> = extracted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["broken.pdf", "photo.jpg", "notes.txt", "empty.docx"]);
        for file in &extracted {
            assert!(
                file.content.starts_with("Error extracting content: "),
                "{}: {}",
                file.name,
                file.content
            );
        }
        assert_eq!(
            extracted[2].content,
            "Error extracting content: unsupported file type"
        );
        assert_eq!(
            extracted[3].content,
            "Error extracting content: no extractable text"
        );
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_ocr_is_killed_after_timeout() {
        let scratch = tempfile::tempdir().unwrap();
        let mut service = service(scratch.path(), TokenPolicy::Capped(1000));
        // `sh <scratch file> stdout` runs the upload body as a script
        service.config.tesseract_bin = "sh".to_string();
        service.config.ocr_timeout = std::time::Duration::from_millis(200);

        let started = std::time::Instant::now();
        let extracted = service
            .extract_all(&[upload("scan.png", "image/png", b"sleep 30\n".to_vec())])
            .await;

        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        assert_eq!(
            extracted[0].content,
            "Error extracting content: sh timed out after 200ms"
        );
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_extracts_pdf_text() {
        let scratch = tempfile::tempdir().unwrap();
        let service = service(scratch.path(), TokenPolicy::Capped(1000));

        let files = vec![upload(
            "police_report.pdf",
            "application/pdf",
            pdf_bytes("Collision at Main Street"),
        )];

        let extracted = service.extract_all(&files).await;

        assert_eq!(extracted[0].name, "police_report.pdf");
        assert!(
            extracted[0].content.contains("Collision"),
            "{}",
            extracted[0].content
        );
        assert!(!extracted[0].content.starts_with("Error"));
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_scratch_write_failure_is_reported() {
        let scratch = tempfile::tempdir().unwrap();
        let missing = scratch.path().join("does-not-exist");
        let service = service(&missing, TokenPolicy::Uncapped);

        let extracted = service
            .extract_all(&[upload("a.pdf", "application/pdf", vec![1, 2, 3])])
            .await;

        assert!(extracted[0].content.starts_with("Error processing file: "));
    }

    #[tokio::test]
    async fn test_content_is_capped_to_token_budget() {
        let scratch = tempfile::tempdir().unwrap();
        let tokenizer = Arc::new(Tokenizer::new().unwrap());
        let service = ExtractionService::new(
            Arc::clone(&tokenizer),
            extraction_config(scratch.path(), TokenPolicy::Capped(50)),
        );

        let paragraph = "The driver ran the red light and struck the vehicle. ".repeat(40);
        let files = vec![upload("long.docx", "", docx_bytes(&[paragraph.trim()]))];

        let extracted = service.extract_all(&files).await;
        let content = &extracted[0].content;
        assert!(content.len() < paragraph.trim().len());
        assert!(content.starts_with("The driver ran the red light"));
        assert!(tokenizer.count_tokens(content) <= 52);
    }
}
