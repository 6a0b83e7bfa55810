//! Product model - catalog documents.

use chrono::{DateTime, Utc};
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dtos::products::ProductCreateRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inventory: i64,
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Free-form attribute bag (size charts, materials, ...); never queried.
    #[serde(default)]
    pub attributes: Document,
    #[serde(default)]
    pub average_review: f64,
    #[serde(default)]
    pub reviews: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_request(req: ProductCreateRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            price: req.price,
            currency: req.currency,
            description: req.description.unwrap_or_default(),
            inventory: req.inventory.unwrap_or(0),
            category: req.category,
            images: req.images.unwrap_or_default(),
            attributes: req
                .attributes
                .map(document_from_json)
                .unwrap_or_default(),
            average_review: 0.0,
            reviews: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Convert a JSON object into a bson document, dropping values bson cannot
/// represent.
pub fn document_from_json(map: serde_json::Map<String, serde_json::Value>) -> Document {
    let mut doc = Document::new();
    for (key, value) in map {
        if let Ok(bson) = mongodb::bson::to_bson(&value) {
            doc.insert(key, bson);
        }
    }
    doc
}
