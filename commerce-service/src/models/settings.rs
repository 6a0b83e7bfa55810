//! Per-user settings document, provisioned at registration.
//!
//! Field names stay camelCase on the wire and in the store; the frontend
//! reads them as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(rename = "loginAlerts")]
    pub login_alerts: bool,
    #[serde(rename = "trustedDevices")]
    pub trusted_devices: bool,
    #[serde(rename = "analyticsTracking")]
    pub analytics_tracking: bool,
    #[serde(rename = "personalizedRecommendations")]
    pub personalized_recommendations: bool,
    #[serde(rename = "darkMode")]
    pub dark_mode: Option<bool>,
    #[serde(rename = "compactProductLayout")]
    pub compact_product_layout: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    pub fn defaults_for(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            login_alerts: true,
            trusted_devices: true,
            analytics_tracking: false,
            personalized_recommendations: false,
            dark_mode: None,
            compact_product_layout: false,
            created_at: now,
            updated_at: now,
        }
    }
}
