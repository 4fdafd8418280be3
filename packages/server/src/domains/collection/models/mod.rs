pub mod collection_entry;

pub use collection_entry::*;
