use rust_decimal::Decimal;
use serde::Serialize;

use crate::features::files::models::ExtractedFile;
use crate::features::research::{ResearchFindings, ResearchResult};

/// Client fields as shown in the prompt
#[derive(Debug, Clone, Serialize)]
pub struct ClientContext {
    pub client_name: String,
    /// ISO date, e.g. `2024-03-18`
    pub incident_date: String,
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DamagesContext {
    pub economic: Decimal,
    pub non_economic: Decimal,
    pub punitive: Decimal,
    pub total: Decimal,
}

impl DamagesContext {
    pub fn new(economic: Decimal, non_economic: Decimal, punitive: Decimal) -> Self {
        Self {
            economic,
            non_economic,
            punitive,
            total: economic + non_economic + punitive,
        }
    }
}

/// Everything the synthesis prompt is rendered from
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub client: ClientContext,
    pub incident_overview: String,
    /// Pretty-printed JSON array of `{name, content}` objects
    pub processed_files: String,
    pub damages: DamagesContext,
    pub jurisdiction: String,
    pub legal_research: Vec<ResearchResult>,
    pub medical_research: Vec<ResearchResult>,
}

impl ReportContext {
    pub fn new(
        client: ClientContext,
        incident_overview: String,
        files: &[ExtractedFile],
        damages: DamagesContext,
        jurisdiction: String,
        findings: ResearchFindings,
    ) -> Self {
        let processed_files =
            serde_json::to_string_pretty(files).unwrap_or_else(|_| "[]".to_string());

        Self {
            client,
            incident_overview,
            processed_files,
            damages,
            jurisdiction,
            legal_research: findings.legal,
            medical_research: findings.medical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::prompts::render_legal_report_prompt;
    use std::str::FromStr;

    fn context(findings: ResearchFindings) -> ReportContext {
        ReportContext::new(
            ClientContext {
                client_name: "Dana Whitfield".to_string(),
                incident_date: "2024-03-18".to_string(),
                contact_info: None,
            },
            "Rear-ended at a red light on Camelback Road.".to_string(),
            &[ExtractedFile {
                name: "er_notes.pdf".to_string(),
                content: "Cervical strain".to_string(),
            }],
            DamagesContext::new(
                Decimal::from_str("1500.50").unwrap(),
                Decimal::from(2000),
                Decimal::ZERO,
            ),
            "Arizona".to_string(),
            findings,
        )
    }

    #[test]
    fn test_damages_total() {
        let damages = DamagesContext::new(
            Decimal::from_str("1500.50").unwrap(),
            Decimal::from(2000),
            Decimal::from_str("0.25").unwrap(),
        );
        assert_eq!(damages.total, Decimal::from_str("3500.75").unwrap());
    }

    #[test]
    fn test_prompt_embeds_intake_and_research() {
        let findings = ResearchFindings {
            legal: vec![ResearchResult {
                title: "A.R.S. 12-2505".to_string(),
                link: "https://example.com/ars".to_string(),
                snippet: "Comparative negligence".to_string(),
                content: None,
            }],
            medical: vec![],
        };

        let prompt = render_legal_report_prompt(&context(findings)).unwrap();

        assert!(prompt.contains("Client Name: Dana Whitfield"));
        assert!(prompt.contains("Incident Date: 2024-03-18"));
        assert!(prompt.contains("Contact Information: N/A"));
        assert!(prompt.contains("\"name\": \"er_notes.pdf\""));
        assert!(prompt.contains("- Economic Damages: $1500.50"));
        assert!(prompt.contains("- Total: $3500.50"));
        assert!(prompt.contains("Relevant Arizona Laws:"));
        assert!(prompt
            .contains("- A.R.S. 12-2505: Comparative negligence (Link: https://example.com/ars)"));
        assert!(prompt.contains("Relevant Medical Literature:\nNo relevant results found."));
    }

    #[test]
    fn test_prompt_includes_scraped_content() {
        let findings = ResearchFindings {
            legal: vec![],
            medical: vec![ResearchResult {
                title: "Whiplash outcomes".to_string(),
                link: "https://example.com/w".to_string(),
                snippet: "Cohort study".to_string(),
                content: Some("Most patients recover within weeks.".to_string()),
            }],
        };

        let prompt = render_legal_report_prompt(&context(findings)).unwrap();
        assert!(prompt.contains("  Content: Most patients recover within weeks."));
    }
}
