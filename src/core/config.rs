use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::features::research::ResearchMode;
use crate::shared::tokenizer::TokenPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreConfig,
    pub swagger: SwaggerConfig,
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    /// Intake sessions idle for longer than this are dropped
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
}

/// Which document store backs files and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Present whenever the backend is Postgres
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// SerpAPI-compatible search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_url: String,
    pub api_key: String,
    pub mode: ResearchMode,
    /// Jurisdiction appended to the legal query, e.g. "Arizona" -> "... Arizona law"
    pub jurisdiction: String,
    /// Number of results kept and scraped in deep mode
    pub deep_result_limit: usize,
    pub timeout: Duration,
}

/// OpenAI-compatible chat completion configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub token_policy: TokenPolicy,
    /// Directory for scratch copies of uploads; system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
    pub tesseract_bin: String,
    pub ocr_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            store: StoreConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            search: SearchConfig::from_env()?,
            llm: LlmConfig::from_env()?,
            extraction: ExtractionConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 50 * 1024 * 1024; // 50MB
    const DEFAULT_SESSION_TTL_SECS: u64 = 86400; // 24 hours
    const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SESSION_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_TTL_SECS must be a valid number".to_string())?;

        let session_sweep_interval_secs = env::var("SESSION_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SESSION_SWEEP_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| "SESSION_SWEEP_INTERVAL_SECS must be a positive number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            session_ttl: Duration::from_secs(session_ttl_secs),
            session_sweep_interval: Duration::from_secs(session_sweep_interval_secs),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, String> {
        let backend = match env::var("DOCUMENT_STORE")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(format!(
                    "DOCUMENT_STORE must be 'postgres' or 'memory', got '{}'",
                    other
                ))
            }
        };

        let database = match backend {
            StoreBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        Ok(Self { backend, database })
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Legal Report API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Case intake and legal report generation".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl SearchConfig {
    const DEFAULT_API_URL: &'static str = "https://serpapi.com/search";
    const DEFAULT_JURISDICTION: &'static str = "Arizona";
    const DEFAULT_DEEP_RESULT_LIMIT: usize = 5;
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let api_url = env::var("SEARCH_API_URL").unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string());

        let api_key = env::var("SEARCH_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "SEARCH_API_KEY environment variable is required".to_string())?;

        let mode = env::var("RESEARCH_MODE")
            .unwrap_or_else(|_| "shallow".to_string())
            .parse::<ResearchMode>()?;

        let jurisdiction =
            env::var("RESEARCH_JURISDICTION").unwrap_or_else(|_| Self::DEFAULT_JURISDICTION.to_string());

        let deep_result_limit = env::var("RESEARCH_DEEP_RESULT_LIMIT")
            .unwrap_or_else(|_| Self::DEFAULT_DEEP_RESULT_LIMIT.to_string())
            .parse::<usize>()
            .map_err(|_| "RESEARCH_DEEP_RESULT_LIMIT must be a valid number".to_string())?;

        let timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "HTTP_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            api_url,
            api_key,
            mode,
            jurisdiction,
            deep_result_limit,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl LlmConfig {
    const DEFAULT_API_URL: &'static str = "https://api.openai.com/v1";
    const DEFAULT_MODEL: &'static str = "gpt-4";
    const DEFAULT_TEMPERATURE: f32 = 0.7;
    const DEFAULT_MAX_TOKENS: u32 = 4000;
    const DEFAULT_TIMEOUT_SECS: u64 = 120;

    pub fn from_env() -> Result<Self, String> {
        let api_url = env::var("LLM_API_URL")
            .unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "OPENAI_API_KEY environment variable is required".to_string())?;

        let model = env::var("LLM_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        let temperature = env::var("LLM_TEMPERATURE")
            .unwrap_or_else(|_| Self::DEFAULT_TEMPERATURE.to_string())
            .parse::<f32>()
            .map_err(|_| "LLM_TEMPERATURE must be a valid number".to_string())?;

        let max_tokens = env::var("LLM_MAX_TOKENS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_TOKENS.to_string())
            .parse::<u32>()
            .map_err(|_| "LLM_MAX_TOKENS must be a valid number".to_string())?;

        let timeout_secs = env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "LLM_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            api_url,
            api_key,
            model,
            temperature,
            max_tokens,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl ExtractionConfig {
    const DEFAULT_TOKEN_BUDGET: usize = 1000;
    const DEFAULT_OCR_TIMEOUT_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let token_policy = match env::var("EXTRACTION_TOKEN_BUDGET") {
            Ok(v) if v.eq_ignore_ascii_case("none") => TokenPolicy::Uncapped,
            Ok(v) => TokenPolicy::Capped(
                v.parse::<usize>()
                    .map_err(|_| "EXTRACTION_TOKEN_BUDGET must be a number or 'none'".to_string())?,
            ),
            Err(_) => TokenPolicy::Capped(Self::DEFAULT_TOKEN_BUDGET),
        };

        let scratch_dir = env::var("EXTRACTION_SCRATCH_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let tesseract_bin = env::var("TESSERACT_BIN").unwrap_or_else(|_| "tesseract".to_string());

        let ocr_timeout_secs = env::var("OCR_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_OCR_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "OCR_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            token_policy,
            scratch_dir,
            tesseract_bin,
            ocr_timeout: Duration::from_secs(ocr_timeout_secs),
        })
    }
}
