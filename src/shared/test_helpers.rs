use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{ExtractionConfig, LlmConfig, SearchConfig};
use crate::features::files::{ExtractionService, FileService};
use crate::features::intake::IntakeService;
use crate::features::reports::{ReportService, SynthesisService};
use crate::features::research::{ResearchMode, ResearchService};
use crate::modules::storage::DocumentStore;
use crate::shared::tokenizer::{TokenPolicy, Tokenizer};

/// Search config pointing at a mock server's `/search` endpoint
pub fn search_config(base_url: &str, mode: ResearchMode) -> SearchConfig {
    SearchConfig {
        api_url: format!("{}/search", base_url),
        api_key: "test-key".to_string(),
        mode,
        jurisdiction: "Arizona".to_string(),
        deep_result_limit: 5,
        timeout: Duration::from_secs(5),
    }
}

/// LLM config pointing at a mock server
pub fn llm_config(base_url: &str) -> LlmConfig {
    LlmConfig {
        api_url: base_url.to_string(),
        api_key: "test-llm-key".to_string(),
        model: "gpt-4".to_string(),
        temperature: 0.7,
        max_tokens: 4000,
        timeout: Duration::from_secs(5),
    }
}

pub fn extraction_config(scratch_dir: &Path, token_policy: TokenPolicy) -> ExtractionConfig {
    ExtractionConfig {
        token_policy,
        scratch_dir: Some(scratch_dir.to_path_buf()),
        tesseract_bin: "tesseract".to_string(),
        ocr_timeout: Duration::from_secs(30),
    }
}

/// Minimal DOCX archive with one paragraph per entry
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                p.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
            )
        })
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Single-page PDF showing `text` in Helvetica, with a valid xref table
pub fn pdf_bytes(text: &str) -> Vec<u8> {
    let stream = format!("BT /F1 18 Tf 72 720 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>".to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
    }

    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

/// Intake service whose search and LLM calls go to `base_url`
pub fn intake_service(
    base_url: &str,
    scratch_dir: &Path,
    store: Arc<dyn DocumentStore>,
) -> IntakeService {
    IntakeService::new(
        Arc::new(FileService::new(Arc::clone(&store))),
        Arc::new(ReportService::new(store)),
        Arc::new(ExtractionService::new(
            Arc::new(Tokenizer::new().unwrap()),
            extraction_config(scratch_dir, TokenPolicy::Capped(1000)),
        )),
        Arc::new(ResearchService::new(search_config(base_url, ResearchMode::Shallow)).unwrap()),
        Arc::new(SynthesisService::new(llm_config(base_url)).unwrap()),
    )
}
