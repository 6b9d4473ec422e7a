//! Webhook subscriptions (`/v3/hooks`) and inbound webhook payloads.

use std::collections::BTreeMap;

use bigcommerce_core::{CustomerId, OrderId, ProductId, StoreHash, VariantId, WebhookId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};

const HOOKS: &str = "v3/hooks";

/// A webhook subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Webhook {
    pub id: WebhookId,
    pub client_id: String,
    pub store_hash: String,
    /// Unix seconds.
    pub created_at: i64,
    pub updated_at: i64,
    /// e.g. `store/order/created`.
    pub scope: String,
    pub destination: String,
    pub is_active: bool,
    /// Headers BigCommerce sends with each delivery.
    pub headers: Option<BTreeMap<String, String>>,
}

impl Webhook {
    /// Whether this subscription delivers `scope` to `destination` with
    /// exactly `headers`. No headers and an empty map are the same.
    #[must_use]
    pub fn matches(&self, scope: &str, destination: &str, headers: &BTreeMap<String, String>) -> bool {
        let own = self.headers.as_ref().filter(|h| !h.is_empty());
        let wanted = Some(headers).filter(|h| !h.is_empty());
        self.scope == scope && self.destination == destination && own == wanted
    }
}

#[derive(Serialize)]
struct CreateWebhook<'a> {
    scope: &'a str,
    destination: &'a str,
    is_active: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: &'a BTreeMap<String, String>,
}

/// Body of a webhook delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookPayload {
    pub scope: String,
    /// `stores/{store_hash}`.
    pub producer: String,
    pub store_id: String,
    pub data: WebhookData,
    pub hash: String,
    /// Unix seconds.
    pub created_at: i64,
}

impl WebhookPayload {
    /// Decode a delivery body.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Decode` if the body is not a webhook payload.
    pub fn from_slice(body: &[u8]) -> Result<Self, BigCommerceError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Store that produced the event, parsed from `producer`.
    #[must_use]
    pub fn store_hash(&self) -> Option<StoreHash> {
        StoreHash::from_context(&self.producer).ok()
    }
}

/// Event details. Which fields are set depends on the scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookData {
    /// `order`, `product`, `cart`, `customer`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    #[serde(rename = "couponId")]
    pub coupon_id: String,
    #[serde(rename = "cartId")]
    pub cart_id: String,
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
    pub address: Option<WebhookAddress>,
    pub inventory: Option<InventoryChange>,
    pub message: Option<OrderMessage>,
    pub sku: Option<SkuRef>,
    pub status: Option<StatusChange>,
}

/// `store/customer/address/*` detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookAddress {
    pub customer_id: CustomerId,
}

/// `store/product/inventory/*` detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryChange {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    /// `absolute` or `relative`.
    pub method: String,
    pub value: f64,
}

/// `store/order/message/created` detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderMessage {
    pub order_message_id: i64,
}

/// `store/sku/*` detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkuRef {
    pub product_id: ProductId,
    pub variant_id: VariantId,
}

/// `store/order/statusUpdated` detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusChange {
    pub previous_status_id: i64,
    pub new_status_id: i64,
}

impl Client {
    /// Get one page of webhook subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_webhooks(&self, page: u32) -> Result<PageResult<Webhook>, BigCommerceError> {
        self.get_page(HOOKS, &[], page).await
    }

    /// Get every webhook subscription.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the subscriptions fetched so far.
    #[instrument(skip(self))]
    pub async fn get_all_webhooks(&self) -> Result<Vec<Webhook>, IncompleteFetch<Webhook, BigCommerceError>> {
        self.get_all(HOOKS, &[]).await
    }

    /// Subscribe `destination` to `scope`, reusing an identical subscription.
    ///
    /// An existing subscription with the same scope, destination and
    /// headers is returned as is, or reactivated if inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if listing, reactivating or creating fails.
    #[instrument(skip(self, headers))]
    pub async fn create_webhook(
        &self,
        scope: &str,
        destination: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<Webhook, BigCommerceError> {
        let existing = self
            .get_all_webhooks()
            .await
            .map_err(|e| e.kind.into_error().unwrap_or(BigCommerceError::Cancelled))?;

        if let Some(mut hook) = existing
            .into_iter()
            .find(|hook| hook.matches(scope, destination, headers))
        {
            if !hook.is_active {
                info!(webhook_id = %hook.id, "Reactivating webhook");
                self.send_empty(
                    Method::PUT,
                    &format!("{HOOKS}/{}", hook.id),
                    &[],
                    Some(&json!({ "is_active": true })),
                )
                .await?;
                hook.is_active = true;
            }
            return Ok(hook);
        }

        let body = CreateWebhook {
            scope,
            destination,
            is_active: true,
            headers,
        };
        let hook: Webhook = self.send_data(Method::POST, HOOKS, &[], &body).await?;
        info!(webhook_id = %hook.id, "Created webhook");
        Ok(hook)
    }

    /// Delete a webhook subscription.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if the subscription does not exist.
    #[instrument(skip(self))]
    pub async fn delete_webhook(&self, id: WebhookId) -> Result<(), BigCommerceError> {
        self.delete(&format!("{HOOKS}/{id}"), &[]).await
    }
}
