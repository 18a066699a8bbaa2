mod report_service;
mod synthesis_service;

pub use report_service::ReportService;
pub use synthesis_service::SynthesisService;
