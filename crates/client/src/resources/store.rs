//! Store profile (`/v2/store`).

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::nullable;
use crate::client::Client;
use crate::error::BigCommerceError;

/// Store-wide settings and contact details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreInfo {
    pub id: String,
    pub domain: String,
    pub secure_url: String,
    pub status: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub country: String,
    pub country_code: String,
    pub phone: String,
    pub admin_email: String,
    pub order_email: String,
    pub favicon_url: String,
    pub timezone: Timezone,
    pub language: String,
    pub currency: String,
    pub currency_symbol: String,
    pub decimal_separator: String,
    pub thousands_separator: String,
    pub decimal_places: u32,
    pub currency_symbol_location: String,
    pub weight_units: String,
    pub dimension_units: String,
    pub dimension_decimal_places: u32,
    pub dimension_decimal_token: String,
    pub dimension_thousands_token: String,
    pub plan_name: String,
    pub plan_level: String,
    pub plan_is_trial: bool,
    #[serde(deserialize_with = "nullable")]
    pub industry: String,
    pub logo: serde_json::Value,
    pub is_price_entered_with_tax: bool,
    pub active_comparison_modules: Vec<serde_json::Value>,
    pub features: StoreFeatures,
}

/// Store timezone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timezone {
    pub name: String,
    /// Seconds east of UTC.
    pub raw_offset: i64,
    pub dst_offset: i64,
    pub dst_correction: bool,
    pub date_format: DateFormat,
}

/// Date formats configured for the control panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormat {
    pub display: String,
    pub export: String,
    pub extended_display: String,
}

/// Feature switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreFeatures {
    pub stencil_enabled: bool,
    pub sitewidehttps_enabled: bool,
    pub facebook_catalog_id: String,
    pub checkout_type: String,
    pub wishlists_enabled: bool,
}

impl Client {
    /// Get the store profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_store_info(&self) -> Result<StoreInfo, BigCommerceError> {
        self.get_json("v2/store", &[]).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_info_decodes() {
        let body = r#"{
            "id": "abc123", "domain": "example.mybigcommerce.com",
            "secure_url": "https://example.mybigcommerce.com", "name": "Example",
            "timezone": {"name": "Europe/London", "raw_offset": 0, "dst_offset": 3600,
                         "dst_correction": true,
                         "date_format": {"display": "jS M Y", "export": "M jS Y", "extended_display": "M jS Y @ g:i A"}},
            "currency": "GBP", "decimal_places": 2, "industry": null, "logo": [],
            "features": {"stencil_enabled": true, "checkout_type": "optimized"}
        }"#;
        let info: StoreInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.timezone.dst_offset, 3600);
        assert_eq!(info.timezone.date_format.display, "jS M Y");
        assert!(info.features.stencil_enabled);
        assert_eq!(info.industry, "");
    }
}
