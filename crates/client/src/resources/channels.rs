//! Sales channels (`/v3/channels`).

use bigcommerce_core::ChannelId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};

/// A storefront, marketplace or POS the store sells through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    /// `storefront`, `marketplace`, `pos`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub platform: String,
    pub status: String,
    pub external_id: String,
    pub icon_url: String,
    pub is_listable_from_ui: bool,
    pub is_visible: bool,
    pub is_enabled: bool,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
}

impl Client {
    /// Get one page of channels.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_channels(&self, page: u32) -> Result<PageResult<Channel>, BigCommerceError> {
        self.get_page("v3/channels", &[], page).await
    }

    /// Get every channel.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the channels fetched so far.
    #[instrument(skip(self))]
    pub async fn get_all_channels(&self) -> Result<Vec<Channel>, IncompleteFetch<Channel, BigCommerceError>> {
        self.paginator()
            .fetch_all(|page| self.get_channels(page))
            .await
    }
}
