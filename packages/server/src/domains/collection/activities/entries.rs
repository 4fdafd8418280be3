//! Collection entry activities.

use serde_json::{Map, Value};
use tracing::info;

use crate::common::CollectionEntryId;
use crate::domains::collection::models::{
    AddToCollection, CollectionEntry, COLLECTION_ENTRY_KIND,
};
use crate::domains::collection::CollectionError;
use crate::domains::uploads::upload_image;
use crate::kernel::{RecordFilter, ServerDeps};

/// Validate and persist a new entry, returning its id.
pub async fn add_entry(
    payload: AddToCollection,
    deps: &ServerDeps,
) -> Result<CollectionEntryId, CollectionError> {
    let doc = payload.validate()?.into_document()?;
    let id = deps.store.create(COLLECTION_ENTRY_KIND, doc).await?;
    let id = CollectionEntryId::from_uuid(id);

    info!(entry_id = %id, "Collection entry added");
    Ok(id)
}

/// Every entry, oldest first.
pub async fn list_entries(deps: &ServerDeps) -> Result<Vec<CollectionEntry>, CollectionError> {
    deps.store
        .list(COLLECTION_ENTRY_KIND, &RecordFilter::all())
        .await?
        .into_iter()
        .map(CollectionEntry::try_from)
        .collect()
}

/// Store `bytes` as the entry's custom image and link it. Returns the new URL.
///
/// The id and the entry's existence are checked before the image is decoded,
/// so a bad id never leaves an orphaned file behind.
pub async fn set_custom_image(
    entry_id: &str,
    bytes: Vec<u8>,
    deps: &ServerDeps,
) -> Result<String, CollectionError> {
    let id: CollectionEntryId = entry_id
        .parse()
        .map_err(|_| CollectionError::InvalidEntryId(entry_id.to_string()))?;

    if deps
        .store
        .get(COLLECTION_ENTRY_KIND, id.into_uuid())
        .await?
        .is_none()
    {
        return Err(CollectionError::NotFound);
    }

    let url = upload_image(deps.uploads.as_ref(), bytes, &format!("custom_{}", id)).await?;

    let mut fields = Map::new();
    fields.insert("customImageUrl".to_string(), Value::String(url.clone()));
    if !deps
        .store
        .update(COLLECTION_ENTRY_KIND, id.into_uuid(), fields)
        .await?
    {
        return Err(CollectionError::NotFound);
    }

    info!(entry_id = %id, url = %url, "Custom image set");
    Ok(url)
}
