//! Typed id aliases for persisted records.

pub use super::id::Id;

/// Marker type for a user's collection entries.
pub struct CollectionEntryRecord;

/// Typed id of a collection entry.
pub type CollectionEntryId = Id<CollectionEntryRecord>;
