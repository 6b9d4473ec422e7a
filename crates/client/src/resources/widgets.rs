//! Page Builder widget templates (`/v3/content/widget-templates`).

use bigcommerce_core::ChannelId;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::client::Client;
use crate::error::BigCommerceError;

/// A reusable Page Builder widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub name: String,
    pub kind: String,
    /// Handlebars markup.
    pub template: String,
    pub template_engine: String,
    /// Page Builder settings schema.
    pub schema: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub storefront_api_query: String,
    pub icon_name: String,
    pub client_rerender: bool,
    pub channel_id: ChannelId,
    #[serde(skip_serializing)]
    pub current_version_uuid: Option<Uuid>,
    #[serde(skip_serializing)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub date_modified: Option<DateTime<Utc>>,
}

impl Client {
    /// Create a widget template.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MalformedData` if the response carries no uuid.
    #[instrument(skip(self, template), fields(name = %template.name))]
    pub async fn create_widget_template(&self, template: &WidgetTemplate) -> Result<WidgetTemplate, BigCommerceError> {
        let created: WidgetTemplate = self
            .send_data(Method::POST, "v3/content/widget-templates", &[], template)
            .await?;
        if created.uuid.is_none() {
            return Err(BigCommerceError::MalformedData(
                "created widget template has no uuid".to_string(),
            ));
        }
        Ok(created)
    }
}
