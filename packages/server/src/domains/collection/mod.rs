//! Collection domain - the user's owned cards with purchase details.
//!
//! Entries live in the record store under `COLLECTION_ENTRY_KIND`. Custom
//! images go through the uploads domain and are linked back by URL.

pub mod activities;
pub mod models;

pub use activities::{add_entry, list_entries, set_custom_image};
pub use models::{AddToCollection, CollectionEntry, CollectionEntryFields, Currency};

use thiserror::Error;

use crate::domains::uploads::UploadError;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Quantity must be at least 1 (got {0})")]
    InvalidQuantity(i64),

    #[error("Purchase price must be a non-negative number (got {0})")]
    InvalidPrice(f64),

    #[error("Unsupported currency: {0}")]
    InvalidCurrency(String),

    #[error("Invalid card code: {0}")]
    InvalidIdCode(String),

    #[error("Language must be EN, JP or Other (got {0})")]
    InvalidLanguage(String),

    #[error("Invalid entry id: {0}")]
    InvalidEntryId(String),

    #[error("Entry not found")]
    NotFound,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Collection store error: {0}")]
    Store(#[from] anyhow::Error),
}
