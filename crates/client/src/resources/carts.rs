//! Storefront carts (`/v3/carts`).
//!
//! Every call asks for `include=redirect_urls` so the returned cart carries
//! its cart and checkout links.

use bigcommerce_core::{ChannelId, CustomerId, ProductId, VariantId};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::client::Client;
use crate::error::BigCommerceError;

const CARTS: &str = "v3/carts";
const INCLUDE_REDIRECT_URLS: [(&str, &str); 1] = [("include", "redirect_urls")];

/// A cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: CustomerId,
    pub channel_id: ChannelId,
    pub email: String,
    pub currency: CartCurrency,
    pub tax_included: bool,
    pub base_amount: f64,
    pub discount_amount: f64,
    pub cart_amount: f64,
    pub discounts: Vec<Discount>,
    pub coupons: Vec<CartCoupon>,
    pub line_items: CartLineItems,
    pub created_time: Option<DateTime<Utc>>,
    pub updated_time: Option<DateTime<Utc>>,
    pub redirect_urls: RedirectUrls,
    pub locale: String,
}

impl Cart {
    /// Number of line items across all item kinds.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.line_items.iter().count()
    }
}

/// Cart currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartCurrency {
    pub code: String,
}

/// Line items grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartLineItems {
    pub physical_items: Vec<LineItem>,
    pub digital_items: Vec<LineItem>,
    pub gift_certificates: Vec<LineItem>,
    pub custom_items: Vec<LineItem>,
}

impl CartLineItems {
    /// All line items, physical first.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.physical_items
            .iter()
            .chain(&self.digital_items)
            .chain(&self.gift_certificates)
            .chain(&self.custom_items)
    }
}

/// A cart line item.
///
/// When adding items only `product_id`, `quantity` and optionally
/// `variant_id` need to be set. Editing or deleting needs `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub url: String,
    pub quantity: f64,
    pub taxable: bool,
    pub image_url: String,
    pub discounts: Vec<Discount>,
    pub coupons: Vec<CartCoupon>,
    pub discount_amount: f64,
    pub coupon_amount: f64,
    pub list_price: f64,
    pub sale_price: f64,
    pub extended_list_price: f64,
    pub extended_sale_price: f64,
    pub is_require_shipping: bool,
    pub is_mutable: bool,
}

impl LineItem {
    /// A line item to add to a cart.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: f64) -> Self {
        Self {
            product_id,
            quantity,
            ..Self::default()
        }
    }

    /// Select a variant.
    #[must_use]
    pub const fn with_variant(mut self, variant_id: VariantId) -> Self {
        self.variant_id = Some(variant_id);
        self
    }
}

/// A coupon applied to a cart or line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartCoupon {
    pub id: String,
    pub code: String,
    pub coupon_type: String,
    pub discounted_amount: f64,
}

/// A discount applied to a cart or line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Discount {
    pub id: String,
    pub discounted_amount: f64,
}

/// Links returned with `include=redirect_urls`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectUrls {
    pub cart_url: String,
    pub checkout_url: String,
    pub embedded_checkout_url: String,
}

fn line_item_id(item: &LineItem) -> Result<Uuid, BigCommerceError> {
    item.id.ok_or(BigCommerceError::MissingField("line_item.id"))
}

impl Client {
    /// Create a cart on the configured channel.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Unprocessable` if BigCommerce rejects the
    /// items (e.g. out of stock).
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn create_cart(&self, items: &[LineItem]) -> Result<Cart, BigCommerceError> {
        let body = json!({
            "channel_id": self.config().channel_id,
            "line_items": items,
        });
        self.send_data(Method::POST, CARTS, &INCLUDE_REDIRECT_URLS, &body)
            .await
    }

    /// Get a cart.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if the cart expired or never existed.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, cart_id: Uuid) -> Result<Cart, BigCommerceError> {
        self.get_data(&format!("{CARTS}/{cart_id}"), &INCLUDE_REDIRECT_URLS)
            .await
    }

    /// Add line items to a cart and return the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn cart_add_items(&self, cart_id: Uuid, items: &[LineItem]) -> Result<Cart, BigCommerceError> {
        let body = json!({ "line_items": items });
        self.send_data(
            Method::POST,
            &format!("{CARTS}/{cart_id}/items"),
            &INCLUDE_REDIRECT_URLS,
            &body,
        )
        .await
    }

    /// Change a line item (typically its quantity) and return the refreshed
    /// cart.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MissingField` if the item has no id.
    #[instrument(skip(self, item))]
    pub async fn cart_edit_item(&self, cart_id: Uuid, item: &LineItem) -> Result<Cart, BigCommerceError> {
        let item_id = line_item_id(item)?;
        let body = json!({ "line_item": item });
        self.send_empty(
            Method::PUT,
            &format!("{CARTS}/{cart_id}/items/{item_id}"),
            &INCLUDE_REDIRECT_URLS,
            Some(&body),
        )
        .await?;
        self.get_cart(cart_id).await
    }

    /// Remove a line item.
    ///
    /// Returns `Ok(None)` when that was the last item: BigCommerce deletes
    /// the cart and answers 204.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MissingField` if the item has no id.
    #[instrument(skip(self, item))]
    pub async fn cart_delete_item(&self, cart_id: Uuid, item: &LineItem) -> Result<Option<Cart>, BigCommerceError> {
        let item_id = line_item_id(item)?;
        let url = self.url(
            &format!("{CARTS}/{cart_id}/items/{item_id}"),
            &INCLUDE_REDIRECT_URLS,
        )?;
        match self.send(Method::DELETE, url, None).await {
            Ok(_) => self.get_cart(cart_id).await.map(Some),
            Err(BigCommerceError::NoContent) => {
                debug!("Cart emptied and removed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Assign a cart to a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn cart_update_customer_id(
        &self,
        cart_id: Uuid,
        customer_id: CustomerId,
    ) -> Result<Cart, BigCommerceError> {
        let body = json!({ "customer_id": customer_id });
        self.send_data(
            Method::PUT,
            &format!("{CARTS}/{cart_id}"),
            &INCLUDE_REDIRECT_URLS,
            &body,
        )
        .await
    }

    /// Delete a cart.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Api` if the API answers anything other than 204.
    #[instrument(skip(self))]
    pub async fn delete_cart(&self, cart_id: Uuid) -> Result<(), BigCommerceError> {
        let url = self.url(&format!("{CARTS}/{cart_id}"), &[])?;
        match self.send(Method::DELETE, url, None).await {
            Err(BigCommerceError::NoContent) => Ok(()),
            Ok(response) => Err(BigCommerceError::Api {
                status: response.status(),
                body: "expected 204 when deleting a cart".to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_decodes() {
        let body = r#"{
            "id": "2d8a1b1f-5b3e-4c84-9a0b-21ad9d2f4c11", "customer_id": 0, "channel_id": 1,
            "currency": {"code": "USD"}, "base_amount": 50, "cart_amount": 45,
            "line_items": {
                "physical_items": [{"id": "a0f1c7a4-8d2b-4a5c-9e16-6f3a1e0f9a77", "product_id": 77,
                                    "variant_id": 12, "quantity": 2, "list_price": 25}],
                "digital_items": [{"id": "c4d9e3f0-1b2a-4c5d-8e7f-9a0b1c2d3e4f", "product_id": 80, "quantity": 1}]
            },
            "redirect_urls": {"cart_url": "https://shop/cart.php?action=load&id=x",
                              "checkout_url": "https://shop/checkout"},
            "created_time": "2024-05-01T10:00:00+00:00"
        }"#;
        let cart: Cart = serde_json::from_str(body).unwrap();
        assert_eq!(cart.currency.code, "USD");
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.redirect_urls.checkout_url, "https://shop/checkout");
        assert_eq!(cart.line_items.physical_items[0].variant_id, Some(VariantId::new(12)));
    }

    #[test]
    fn test_new_line_item_omits_unset_ids() {
        let item = LineItem::new(ProductId::new(77), 1.0).with_variant(VariantId::new(5));
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["product_id"], 77);
        assert_eq!(value["variant_id"], 5);
    }

    #[test]
    fn test_line_item_id_required() {
        let item = LineItem::new(ProductId::new(1), 1.0);
        assert!(matches!(
            line_item_id(&item),
            Err(BigCommerceError::MissingField("line_item.id"))
        ));
    }
}
