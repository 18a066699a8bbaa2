use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::core::config::SearchConfig;
use crate::core::error::{AppError, Result};
use crate::features::research::models::{ResearchMode, ResearchResult};
use crate::shared::constants::{HTTP_USER_AGENT, NO_SNIPPET};

lazy_static! {
    /// Elements whose text is kept when scraping a result page
    static ref CONTENT_SELECTOR: Selector =
        Selector::parse("p, h1, h2, h3, h4, h5, h6, li").unwrap();
}

/// Search API response; only the organic results are used
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

/// Search engine selector understood by the search API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchEngine {
    Scholar,
    Web,
}

impl SearchEngine {
    fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Scholar => "google_scholar",
            SearchEngine::Web => "google",
        }
    }
}

/// Results of both research queries for one report
#[derive(Debug, Clone, Default)]
pub struct ResearchFindings {
    pub legal: Vec<ResearchResult>,
    pub medical: Vec<ResearchResult>,
}

/// Client for the jurisdiction and medical research queries
pub struct ResearchService {
    client: reqwest::Client,
    config: SearchConfig,
}

impl ResearchService {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(HTTP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn jurisdiction(&self) -> &str {
        &self.config.jurisdiction
    }

    /// Run both queries for an incident narrative
    pub async fn research(&self, narrative: &str) -> ResearchFindings {
        let legal = self.fetch_legal_research(narrative).await;
        let medical = self.fetch_medical_literature(narrative).await;

        tracing::info!(
            mode = %self.config.mode,
            legal_results = legal.len(),
            medical_results = medical.len(),
            "Research completed"
        );

        ResearchFindings { legal, medical }
    }

    /// Scholarly search for law in the configured jurisdiction
    pub async fn fetch_legal_research(&self, narrative: &str) -> Vec<ResearchResult> {
        let query = format!("{} {} law", narrative, self.config.jurisdiction);
        self.search(&query, SearchEngine::Scholar).await
    }

    /// Web search for related medical literature
    pub async fn fetch_medical_literature(&self, narrative: &str) -> Vec<ResearchResult> {
        let query = format!("{} medical", narrative);
        self.search(&query, SearchEngine::Web).await
    }

    /// Execute one search. Any failure degrades to an empty list.
    async fn search(&self, query: &str, engine: SearchEngine) -> Vec<ResearchResult> {
        let results = match self.execute_search(query, engine).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(engine = engine.as_str(), "Search failed: {}", e);
                return Vec::new();
            }
        };

        match self.config.mode {
            ResearchMode::Shallow => results,
            ResearchMode::Deep => {
                let mut deep = Vec::new();
                for mut result in results.into_iter().take(self.config.deep_result_limit) {
                    result.content = Some(self.scrape(&result.link).await);
                    deep.push(result);
                }
                deep
            }
        }
    }

    async fn execute_search(&self, query: &str, engine: SearchEngine) -> Result<Vec<ResearchResult>> {
        let url = format!(
            "{}?q={}&engine={}&api_key={}",
            self.config.api_url,
            urlencoding::encode(query),
            engine.as_str(),
            urlencoding::encode(&self.config.api_key)
        );

        tracing::debug!(engine = engine.as_str(), "Searching: {}", query);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Search request failed: {}", e.without_url()))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Search API returned status: {}", response.status());
            return Ok(Vec::new());
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse search response: {}", e))
        })?;

        Ok(body
            .organic_results
            .into_iter()
            .filter_map(|r| {
                Some(ResearchResult {
                    title: r.title?,
                    link: r.link?,
                    snippet: r.snippet.unwrap_or_else(|| NO_SNIPPET.to_string()),
                    content: None,
                })
            })
            .collect())
    }

    /// Fetch a result page and return its readable text, or an error string
    async fn scrape(&self, link: &str) -> String {
        match self.fetch_page(link).await {
            Ok(html) => {
                let text = extract_page_text(&html);
                if text.is_empty() {
                    "No readable content found".to_string()
                } else {
                    text
                }
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", link, e);
                format!("Error fetching content: {}", e)
            }
        }
    }

    async fn fetch_page(&self, link: &str) -> std::result::Result<String, reqwest::Error> {
        self.client
            .get(link)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

/// Visible text of paragraphs, headings and list items, one element per line
fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&CONTENT_SELECTOR)
        .map(|element| {
            element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
