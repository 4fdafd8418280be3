use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Default marketplace the search core scrapes.
pub const DEFAULT_MARKETPLACE_BASE_URL: &str = "https://www.cardmarket.com";

/// Which extractor backend parses the marketplace search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorBackend {
    /// Regex scan over anchors, tolerant of markup drift.
    #[default]
    Pattern,
    /// CSS selectors over result rows.
    Selector,
}

impl std::str::FromStr for ExtractorBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pattern" => Ok(ExtractorBackend::Pattern),
            "selector" => Ok(ExtractorBackend::Selector),
            other => Err(anyhow::anyhow!("Invalid extractor backend: {}", other)),
        }
    }
}

/// Where and how to reach the marketplace.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct MarketplaceConfig {
    #[builder(default = DEFAULT_MARKETPLACE_BASE_URL.to_string())]
    pub base_url: String,
    /// Path fragment every product link contains.
    #[builder(default = "/en/OnePiece/".to_string())]
    pub path_prefix: String,
    /// Search path, `{query}` is replaced with the percent-encoded query.
    #[builder(default = "/en/OnePiece/Products/Search?searchString={query}".to_string())]
    pub search_path: String,
    #[builder(default = Duration::from_secs(15))]
    pub timeout: Duration,
    #[builder(default)]
    pub extractor: ExtractorBackend,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MarketplaceConfig {
    /// Full search-page URL for a free-text query.
    pub fn search_url(&self, query: &str) -> String {
        let path = self
            .search_path
            .replace("{query}", &urlencoding::encode(query));
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Settings for the optional search-by-image capability.
#[derive(Debug, Clone)]
pub struct ImageMatchConfig {
    pub enabled: bool,
    /// Largest Hamming distance between average hashes still counted as a match.
    pub max_distance: u32,
    /// Drop matches whose language is not EN or JP.
    pub known_languages_only: bool,
}

impl Default for ImageMatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_distance: 2,
            known_languages_only: true,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Postgres URL; the in-memory record store is used when unset.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub marketplace: MarketplaceConfig,
    pub image_match: ImageMatchConfig,
    pub upload_dir: PathBuf,
    pub rate_api_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let marketplace = MarketplaceConfig::builder()
            .base_url(
                env::var("MARKETPLACE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_MARKETPLACE_BASE_URL.to_string()),
            )
            .timeout(Duration::from_secs(
                env::var("MARKETPLACE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .context("MARKETPLACE_TIMEOUT_SECS must be a number of seconds")?,
            ))
            .extractor(
                env::var("EXTRACTOR_BACKEND")
                    .unwrap_or_else(|_| "pattern".to_string())
                    .parse::<ExtractorBackend>()?,
            )
            .build();

        let image_match = ImageMatchConfig {
            enabled: parse_bool("IMAGE_MATCHING_ENABLED", false)?,
            max_distance: env::var("IMAGE_MATCH_THRESHOLD")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("IMAGE_MATCH_THRESHOLD must be a non-negative integer")?,
            known_languages_only: parse_bool("IMAGE_MATCH_KNOWN_LANGUAGES_ONLY", true)?,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            marketplace,
            image_match,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            rate_api_url: env::var("RATE_API_URL")
                .unwrap_or_else(|_| "https://api.exchangerate.host".to_string()),
        })
    }
}

fn parse_bool(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => anyhow::bail!("{} must be a boolean, got {:?}", name, value),
        },
    }
}
