//! Interpretation of feed snapshot payloads.
//!
//! A snapshot payload maps opaque product keys to product records. The
//! document store delivers `null` when the collection is absent, and a JSON
//! array instead of an object when every key happens to be a small integer.

use nona_store_core::{Category, Price, Product, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// A full product snapshot, ready to replace the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub products: Vec<Product>,
    /// Records that could not be interpreted and were left out.
    pub rejected: usize,
}

/// Why a single record was left out of a snapshot.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is not an object: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("record has no name")]
    MissingName,
    #[error("record has no price")]
    MissingPrice,
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] nona_store_core::PriceError),
    #[error("record has no category")]
    MissingCategory,
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

/// Raw product record fields as written by the admin tool.
#[derive(Debug, Deserialize)]
struct ProductRecord {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    category: Option<String>,
    images: Option<Vec<Option<String>>>,
}

impl Snapshot {
    /// Interpret a snapshot payload.
    ///
    /// `null` and non-collection payloads yield an empty snapshot. Individual
    /// records that cannot be interpreted are skipped and logged.
    #[must_use]
    pub fn from_json(payload: Value) -> Self {
        let entries: Vec<(String, Value)> = match payload {
            Value::Object(map) => map.into_iter().collect(),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .filter(|(_, record)| !record.is_null())
                .map(|(index, record)| (index.to_string(), record))
                .collect(),
            Value::Null => Vec::new(),
            other => {
                tracing::warn!(payload = %other, "Ignoring non-collection feed payload");
                Vec::new()
            }
        };

        let mut snapshot = Self::default();
        for (key, record) in entries {
            match parse_record(&key, record) {
                Ok(product) => snapshot.products.push(product),
                Err(e) => {
                    tracing::warn!(product_id = %key, error = %e, "Skipping product record");
                    snapshot.rejected += 1;
                }
            }
        }
        snapshot
    }
}

fn parse_record(key: &str, record: Value) -> Result<Product, RecordError> {
    let record: ProductRecord = serde_json::from_value(record)?;

    let name = record
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or(RecordError::MissingName)?;
    let price = Price::new(record.price.ok_or(RecordError::MissingPrice)?)?;
    let slug = record.category.ok_or(RecordError::MissingCategory)?;
    let category = Category::parse(slug.trim())
        .filter(|c| !c.is_filter_only())
        .ok_or(RecordError::UnknownCategory(slug))?;
    let images = record
        .images
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter(|url| !url.trim().is_empty())
        .collect();

    Ok(Product {
        id: ProductId::new(key),
        name,
        description: record.description.filter(|d| !d.is_empty()),
        price,
        category,
        images,
    })
}
