pub mod listing;

pub use listing::{detect_language, find_id_code, is_id_code, Language, Listing, ListingSource};
