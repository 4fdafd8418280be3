//! Marketplace search: listing extraction, fallback policy, orchestration and
//! the optional search-by-image capability.

pub mod extract;
pub mod fallback;
pub mod image_match;
pub mod models;
pub mod search;

pub use extract::{ListingExtractor, PatternExtractor, SelectorExtractor, MAX_LISTINGS};
pub use fallback::fallback;
pub use models::{Language, Listing, ListingSource};
pub use search::MarketplaceSearch;
