//! Degraded results for when the marketplace yields nothing usable.
//!
//! Upstream blocking is routine, so "nothing found" is always a successful,
//! possibly empty, result and never an error.

use crate::config::MarketplaceConfig;

use super::models::{find_id_code, Listing, ListingSource};

/// A single stub listing pointing at the marketplace search page when the
/// query carries an id code; otherwise nothing.
pub fn fallback(query: &str, marketplace: &MarketplaceConfig) -> Vec<Listing> {
    let Some(id_code) = find_id_code(query) else {
        return Vec::new();
    };

    let name = query.trim();
    vec![Listing {
        id_code: Some(id_code),
        name: (!name.is_empty()).then(|| name.to_string()),
        language: None,
        image_url: None,
        source_url: marketplace.search_url(query),
        source: ListingSource::Cardmarket,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_with_id_code_yields_stub() {
        let config = MarketplaceConfig::default();
        let listings = fallback("  op05-119 luffy ", &config);

        assert_eq!(listings.len(), 1);
        let stub = &listings[0];
        assert_eq!(stub.id_code.as_deref(), Some("OP05-119"));
        assert_eq!(stub.name.as_deref(), Some("op05-119 luffy"));
        assert_eq!(stub.language, None);
        assert_eq!(stub.image_url, None);
        assert_eq!(stub.source_url, config.search_url("  op05-119 luffy "));
    }

    #[test]
    fn test_query_without_id_code_yields_nothing() {
        let config = MarketplaceConfig::default();
        assert!(fallback("random nonsense", &config).is_empty());
        assert!(fallback("", &config).is_empty());
        assert!(fallback("OP5-119", &config).is_empty());
    }
}
