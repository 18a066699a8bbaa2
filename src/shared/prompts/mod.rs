//! Prompt template management.
//!
//! Templates live in `templates/prompts/` and use Jinja2 syntax.

pub mod engine;

pub use engine::{render_template, template_exists, TemplateError};

use minijinja::Value;

const LEGAL_REPORT_SYSTEM: &str = "legal_report/system.jinja";
const LEGAL_REPORT_USER: &str = "legal_report/user.jinja";

/// Report templates that are not registered
pub fn missing_report_templates() -> Vec<&'static str> {
    [LEGAL_REPORT_SYSTEM, LEGAL_REPORT_USER]
        .into_iter()
        .filter(|name| !template_exists(name))
        .collect()
}

/// Render the system instruction for report synthesis
pub fn render_legal_report_system_prompt() -> Result<String, TemplateError> {
    render_template(LEGAL_REPORT_SYSTEM, Value::UNDEFINED)
}

/// Render the report synthesis prompt.
///
/// The context must provide `client`, `incident_overview`, `processed_files`,
/// `damages`, `jurisdiction`, `legal_research` and `medical_research`.
pub fn render_legal_report_prompt<S: serde::Serialize>(
    context: &S,
) -> Result<String, TemplateError> {
    render_template(LEGAL_REPORT_USER, Value::from_serialize(context))
}
