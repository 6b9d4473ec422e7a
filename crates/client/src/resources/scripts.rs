//! Storefront scripts (`/v3/content/scripts`).

use bigcommerce_core::ChannelId;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::client::Client;
use crate::error::BigCommerceError;

const SCRIPTS: &str = "v3/content/scripts";

/// A script injected into storefront pages.
///
/// Set either `html` (with `kind = "script_tag"`) or `src` (with
/// `kind = "src"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub src: String,
    pub auto_uninstall: bool,
    /// `default`, `async` or `defer`.
    pub load_method: String,
    /// `head` or `footer`.
    pub location: String,
    /// `storefront`, `all_pages`, `checkout` or `order_confirmation`.
    pub visibility: String,
    pub kind: String,
    #[serde(skip_serializing)]
    pub api_client_id: String,
    pub consent_category: String,
    pub enabled: bool,
    pub channel_id: ChannelId,
    #[serde(skip_serializing)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub date_modified: Option<DateTime<Utc>>,
}

impl Client {
    /// Install a script.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MalformedData` if the response carries no uuid.
    #[instrument(skip(self, script), fields(name = %script.name))]
    pub async fn create_script(&self, script: &Script) -> Result<Script, BigCommerceError> {
        let created: Script = self.send_data(Method::POST, SCRIPTS, &[], script).await?;
        if created.uuid.is_none() {
            return Err(BigCommerceError::MalformedData(
                "created script has no uuid".to_string(),
            ));
        }
        Ok(created)
    }

    /// Get a script.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if the script does not exist.
    #[instrument(skip(self))]
    pub async fn get_script(&self, uuid: Uuid) -> Result<Script, BigCommerceError> {
        self.get_data(&format!("{SCRIPTS}/{uuid}"), &[]).await
    }

    /// Get the scripts installed by this API account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_scripts(&self) -> Result<Vec<Script>, BigCommerceError> {
        self.get_data(SCRIPTS, &[]).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_script_body() {
        let script = Script {
            name: "Analytics".into(),
            src: "https://cdn.example.com/a.js".into(),
            kind: "src".into(),
            location: "footer".into(),
            enabled: true,
            ..Script::default()
        };
        let value = serde_json::to_value(&script).unwrap();
        assert!(value.get("uuid").is_none());
        assert!(value.get("html").is_none());
        assert!(value.get("date_created").is_none());
        assert_eq!(value["src"], "https://cdn.example.com/a.js");
    }
}
