//! Product list model - wishlists and user-defined lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the list every account gets at registration. Protected from
/// create/rename/delete through the API.
pub const WISHLIST_NAME: &str = "Wishlist";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductList {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub product_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductList {
    pub fn new(user_id: String, name: String, product_ids: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            product_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// The default wishlist provisioned for a new account.
    pub fn default_wishlist(user_id: String) -> Self {
        Self::new(user_id, WISHLIST_NAME.to_string(), Vec::new())
    }

    pub fn is_wishlist(&self) -> bool {
        self.name == WISHLIST_NAME
    }
}
