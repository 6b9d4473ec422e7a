//! Storefront themes (`/v3/themes`).

use bigcommerce_core::ChannelId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::client::Client;
use crate::error::BigCommerceError;

const THEMES: &str = "v3/themes";

/// An installed theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub uuid: Uuid,
    pub name: String,
    pub variations: Vec<ThemeVariation>,
    pub is_private: bool,
    pub is_active: bool,
}

/// A style variation of a theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeVariation {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub external_id: String,
}

/// A theme configuration.
///
/// Theme settings are free-form and differ between themes, so they are kept
/// as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub uuid: Uuid,
    pub store_hash: String,
    pub channel_id: ChannelId,
    pub settings: serde_json::Map<String, serde_json::Value>,
    pub theme_uuid: Uuid,
    pub version_uuid: Uuid,
    pub variation_uuid: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ThemeConfig {
    /// A string setting such as `color-primary` or `body-font`.
    #[must_use]
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(serde_json::Value::as_str)
    }

    /// A boolean setting such as `hide_breadcrumbs`.
    #[must_use]
    pub fn setting_bool(&self, key: &str) -> Option<bool> {
        self.settings.get(key).and_then(serde_json::Value::as_bool)
    }

    /// A numeric setting such as `categorypage_products_per_page`.
    #[must_use]
    pub fn setting_i64(&self, key: &str) -> Option<i64> {
        self.settings.get(key).and_then(serde_json::Value::as_i64)
    }
}

impl Client {
    /// Get all installed themes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_themes(&self) -> Result<Vec<Theme>, BigCommerceError> {
        self.get_data(THEMES, &[]).await
    }

    /// Get the current configuration of a theme.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MalformedData` if the theme has no
    /// configuration.
    #[instrument(skip(self))]
    pub async fn get_theme_config(&self, theme_uuid: Uuid) -> Result<ThemeConfig, BigCommerceError> {
        let configs: Vec<ThemeConfig> = self
            .get_data(&format!("{THEMES}/{theme_uuid}/configurations"), &[])
            .await?;
        configs.into_iter().next().ok_or_else(|| {
            BigCommerceError::MalformedData(format!("theme {theme_uuid} has no configuration"))
        })
    }

    /// Get the configuration of the active theme, if one is active.
    ///
    /// Variations are not considered.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    #[instrument(skip(self))]
    pub async fn get_active_theme_config(&self) -> Result<Option<ThemeConfig>, BigCommerceError> {
        let themes = self.get_themes().await?;
        let Some(active) = themes.iter().find(|theme| theme.is_active) else {
            debug!(count = themes.len(), "No active theme");
            return Ok(None);
        };
        self.get_theme_config(active.uuid).await.map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_config_settings() {
        let config: ThemeConfig = serde_json::from_str(
            r##"{"uuid": "6f4e1b56-4f0b-4b6c-8a1e-0c9d1f2e3a4b", "channel_id": 1,
                "settings": {"color-primary": "#444444", "hide_breadcrumbs": false,
                             "categorypage_products_per_page": 12},
                "theme_uuid": "0b3c6e1a-2d4f-4a8b-9c7d-1e2f3a4b5c6d",
                "created_at": "2023-01-10T12:00:00Z"}"##,
        )
        .unwrap();
        assert_eq!(config.setting_str("color-primary"), Some("#444444"));
        assert_eq!(config.setting_bool("hide_breadcrumbs"), Some(false));
        assert_eq!(config.setting_i64("categorypage_products_per_page"), Some(12));
        assert_eq!(config.setting_str("missing"), None);
        assert!(config.variation_uuid.is_nil());
    }
}
