use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::CollectionEntryId;
use crate::domains::marketplace::models::is_id_code;
use crate::kernel::StoredRecord;

use crate::domains::collection::CollectionError;

/// Record kind collection entries are stored under.
pub const COLLECTION_ENTRY_KIND: &str = "collectionentry";

/// Currency a purchase or price is recorded in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Eur => write!(f, "EUR"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(CollectionError::InvalidCurrency(s.to_string())),
        }
    }
}

/// The persisted document body of a collection entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntryFields {
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub id_code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub custom_image_url: Option<String>,

    pub quantity: i64,
    pub purchase_price: f64,
    #[serde(default)]
    pub purchase_currency: Currency,

    // Updated out-of-band by price tracking
    #[serde(default)]
    pub last_known_price: Option<f64>,
    #[serde(default)]
    pub last_known_currency: Option<Currency>,
}

impl CollectionEntryFields {
    pub fn into_document(self) -> Result<Map<String, Value>, CollectionError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(doc)) => Ok(doc),
            Ok(_) => Err(CollectionError::Store(anyhow::anyhow!(
                "collection entry did not serialize to an object"
            ))),
            Err(e) => Err(CollectionError::Store(e.into())),
        }
    }
}

/// A user's owned-card record.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    #[serde(rename = "_id")]
    pub id: CollectionEntryId,
    #[serde(flatten)]
    pub fields: CollectionEntryFields,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StoredRecord> for CollectionEntry {
    type Error = CollectionError;

    fn try_from(record: StoredRecord) -> Result<Self, Self::Error> {
        let fields: CollectionEntryFields = serde_json::from_value(Value::Object(record.doc))
            .map_err(|e| {
                CollectionError::Store(anyhow::anyhow!(
                    "Malformed collection entry {}: {}",
                    record.id,
                    e
                ))
            })?;

        Ok(Self {
            id: CollectionEntryId::from_uuid(record.id),
            fields,
            created_at: record.created_at,
        })
    }
}

fn default_source() -> Option<String> {
    Some("cardmarket".to_string())
}

fn default_quantity() -> i64 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Request body of add-to-collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCollection {
    #[serde(default)]
    pub id_code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default = "default_source")]
    pub source: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub purchase_price: f64,
    #[serde(default = "default_currency")]
    pub purchase_currency: String,
}

impl AddToCollection {
    /// Check the payload and normalize it into a storable entry.
    pub fn validate(self) -> Result<CollectionEntryFields, CollectionError> {
        if self.quantity < 1 {
            return Err(CollectionError::InvalidQuantity(self.quantity));
        }
        if !self.purchase_price.is_finite() || self.purchase_price < 0.0 {
            return Err(CollectionError::InvalidPrice(self.purchase_price));
        }
        let purchase_currency: Currency = self.purchase_currency.parse()?;

        let id_code = match non_blank(self.id_code) {
            Some(code) if is_id_code(&code) => Some(code.to_ascii_uppercase()),
            Some(code) => return Err(CollectionError::InvalidIdCode(code)),
            None => None,
        };

        let language = match non_blank(self.language) {
            Some(lang) => match lang.to_ascii_uppercase().as_str() {
                "EN" | "JP" => Some(lang.to_ascii_uppercase()),
                "OTHER" => Some("Other".to_string()),
                _ => return Err(CollectionError::InvalidLanguage(lang)),
            },
            None => None,
        };

        Ok(CollectionEntryFields {
            card_id: None,
            id_code,
            name: non_blank(self.name),
            language,
            source: non_blank(self.source),
            source_url: non_blank(self.source_url),
            image_url: non_blank(self.image_url),
            custom_image_url: None,
            quantity: self.quantity,
            purchase_price: self.purchase_price,
            purchase_currency,
            last_known_price: None,
            last_known_currency: None,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
