/// Maximum size of a single uploaded file (16MB)
pub const MAX_FILE_SIZE: usize = 16 * 1024 * 1024;

/// Snippet used when a search hit carries none
pub const NO_SNIPPET: &str = "No description available";

/// Notice returned when retrieval finds nothing for a user id
pub const NO_REPORTS_FOUND: &str = "No reports found for the given User ID.";

/// User agent sent to the search API and to scraped pages
pub const HTTP_USER_AGENT: &str = "LegalReportCore/0.1 (case-intake)";

/// Content type of rendered and downloaded reports
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
