use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Card id code - two letters, two digits, hyphen, three digits (OP05-119)
    static ref ID_CODE_REGEX: Regex = Regex::new(r"(?i)[A-Z]{2}\d{2}-\d{3}").unwrap();

    static ref ENGLISH_REGEX: Regex = Regex::new(r"(?i)english").unwrap();
    static ref JAPANESE_REGEX: Regex = Regex::new(r"(?i)japanese").unwrap();
}

/// Marketplace a listing was scraped from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    #[default]
    Cardmarket,
}

impl std::fmt::Display for ListingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingSource::Cardmarket => write!(f, "cardmarket"),
        }
    }
}

/// Print language of a card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Language {
    #[serde(rename = "EN")]
    English,
    #[serde(rename = "JP")]
    Japanese,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Japanese => "JP",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A single search result scraped from the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id_code: Option<String>,
    pub name: Option<String>,
    pub language: Option<Language>,
    pub image_url: Option<String>,
    /// Absolute product URL without query string. Unique within one result set.
    pub source_url: String,
    #[serde(default)]
    pub source: ListingSource,
}

impl Listing {
    /// Build a listing from the text found around a product link, deriving the
    /// id code and language from that text.
    pub fn from_text(source_url: String, name: Option<String>, image_url: Option<String>) -> Self {
        let (id_code, language) = match name.as_deref() {
            Some(text) => (find_id_code(text), detect_language(text)),
            None => (None, None),
        };

        Self {
            id_code,
            name,
            language,
            image_url,
            source_url,
            source: ListingSource::Cardmarket,
        }
    }
}

/// First id code in `text`, uppercased.
pub fn find_id_code(text: &str) -> Option<String> {
    ID_CODE_REGEX
        .find(text)
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Whether the whole of `code` is a well-formed id code (any letter case).
pub fn is_id_code(code: &str) -> bool {
    ID_CODE_REGEX
        .find(code)
        .map(|m| m.start() == 0 && m.end() == code.len())
        .unwrap_or(false)
}

/// Language from an `english`/`japanese` keyword hint; English wins if both appear.
pub fn detect_language(text: &str) -> Option<Language> {
    if ENGLISH_REGEX.is_match(text) {
        Some(Language::English)
    } else if JAPANESE_REGEX.is_match(text) {
        Some(Language::Japanese)
    } else {
        None
    }
}
