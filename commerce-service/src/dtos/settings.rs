use serde::Deserialize;
use validator::Validate;

/// Partial settings update; omitted fields are left untouched. Wire names
/// stay camelCase for the frontend.
#[derive(Debug, Deserialize, Validate)]
pub struct SettingsUpdateRequest {
    #[serde(rename = "loginAlerts")]
    pub login_alerts: Option<bool>,

    #[serde(rename = "trustedDevices")]
    pub trusted_devices: Option<bool>,

    #[serde(rename = "analyticsTracking")]
    pub analytics_tracking: Option<bool>,

    #[serde(rename = "personalizedRecommendations")]
    pub personalized_recommendations: Option<bool>,

    #[serde(rename = "darkMode")]
    pub dark_mode: Option<bool>,

    #[serde(rename = "compactProductLayout")]
    pub compact_product_layout: Option<bool>,
}

impl SettingsUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.login_alerts.is_none()
            && self.trusted_devices.is_none()
            && self.analytics_tracking.is_none()
            && self.personalized_recommendations.is_none()
            && self.dark_mode.is_none()
            && self.compact_product_layout.is_none()
    }
}
