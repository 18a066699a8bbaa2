use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// How much of each search hit is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResearchMode {
    /// Title, link and snippet of every organic result
    #[default]
    Shallow,
    /// Top results only, each page fetched and scraped into `content`
    Deep,
}

impl FromStr for ResearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shallow" => Ok(ResearchMode::Shallow),
            "deep" => Ok(ResearchMode::Deep),
            other => Err(format!(
                "RESEARCH_MODE must be 'shallow' or 'deep', got '{}'",
                other
            )),
        }
    }
}

impl std::fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResearchMode::Shallow => write!(f, "shallow"),
            ResearchMode::Deep => write!(f, "deep"),
        }
    }
}

/// A single search hit. Produced per report generation and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Scraped page text, or an error string when the page could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
