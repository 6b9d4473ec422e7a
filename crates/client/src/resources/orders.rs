//! Orders (`/v2/orders`).
//!
//! v2 endpoints return bare arrays, money as decimal strings, and answer
//! 204 for an empty result.

use bigcommerce_core::{ChannelId, CouponId, CurrencyId, CustomerId, OrderId, ProductId};
use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{instrument, warn};

use super::nullable;
use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};

const ORDERS: &str = "v2/orders";

/// An order.
///
/// `products`, `shipping_addresses` and `coupons` are resource links in the
/// list response; [`Client::get_order`] fills them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub date_created: String,
    pub date_modified: String,
    #[serde(deserialize_with = "nullable")]
    pub date_shipped: String,
    pub status_id: i64,
    pub status: String,
    pub custom_status: String,
    pub subtotal_ex_tax: Decimal,
    pub subtotal_inc_tax: Decimal,
    pub subtotal_tax: Decimal,
    pub base_shipping_cost: Decimal,
    pub shipping_cost_ex_tax: Decimal,
    pub shipping_cost_inc_tax: Decimal,
    pub shipping_cost_tax: Decimal,
    pub base_handling_cost: Decimal,
    pub handling_cost_ex_tax: Decimal,
    pub handling_cost_inc_tax: Decimal,
    pub handling_cost_tax: Decimal,
    pub base_wrapping_cost: Decimal,
    pub wrapping_cost_ex_tax: Decimal,
    pub wrapping_cost_inc_tax: Decimal,
    pub wrapping_cost_tax: Decimal,
    pub total_ex_tax: Decimal,
    pub total_inc_tax: Decimal,
    pub total_tax: Decimal,
    pub items_total: i64,
    pub items_shipped: i64,
    pub payment_method: String,
    #[serde(deserialize_with = "nullable")]
    pub payment_provider_id: String,
    pub payment_status: String,
    pub refunded_amount: Decimal,
    pub order_is_digital: bool,
    pub store_credit_amount: Decimal,
    pub gift_certificate_amount: Decimal,
    pub ip_address: String,
    pub geoip_country: String,
    pub geoip_country_iso2: String,
    pub currency_id: CurrencyId,
    pub currency_code: String,
    pub currency_exchange_rate: Decimal,
    pub default_currency_id: CurrencyId,
    pub default_currency_code: String,
    pub store_default_currency_code: String,
    pub staff_notes: String,
    pub customer_message: String,
    pub discount_amount: Decimal,
    pub coupon_discount: Decimal,
    pub shipping_address_count: i64,
    pub is_deleted: bool,
    #[serde(deserialize_with = "nullable")]
    pub cart_id: String,
    pub billing_address: OrderAddress,
    pub is_email_opt_in: bool,
    pub order_source: String,
    pub channel_id: ChannelId,
    #[serde(deserialize_with = "nullable")]
    pub external_source: String,
    pub external_id: Option<serde_json::Value>,
    pub customer_locale: String,
    #[serde(deserialize_with = "resource_list")]
    pub products: Vec<OrderProduct>,
    #[serde(deserialize_with = "resource_list")]
    pub shipping_addresses: Vec<OrderShippingAddress>,
    #[serde(deserialize_with = "resource_list")]
    pub coupons: Vec<OrderCoupon>,
}

/// Billing address of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderAddress {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub street_1: String,
    pub street_2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub country_iso2: String,
    pub phone: String,
    pub email: String,
    pub form_fields: Vec<serde_json::Value>,
}

/// A product line on an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderProduct {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub order_address_id: i64,
    pub name: String,
    pub name_customer: String,
    pub name_merchant: String,
    pub sku: String,
    pub upc: String,
    /// `physical` or `digital`.
    #[serde(rename = "type")]
    pub kind: String,
    pub base_price: Decimal,
    pub price_ex_tax: Decimal,
    pub price_inc_tax: Decimal,
    pub price_tax: Decimal,
    pub base_total: Decimal,
    pub total_ex_tax: Decimal,
    pub total_inc_tax: Decimal,
    pub total_tax: Decimal,
    pub weight: Decimal,
    pub quantity: i64,
    pub base_cost_price: Decimal,
    pub is_refunded: bool,
    pub quantity_refunded: i64,
    pub refund_amount: Decimal,
    pub quantity_shipped: i64,
    pub fixed_shipping_cost: Decimal,
    pub is_bundled_product: bool,
    pub bin_picking_number: String,
    pub parent_order_product_id: Option<i64>,
    pub applied_discounts: Vec<AppliedDiscount>,
    pub product_options: Vec<ProductOption>,
}

/// A discount applied to an order product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppliedDiscount {
    pub id: String,
    pub amount: Decimal,
    pub name: String,
    pub code: Option<String>,
    pub target: String,
}

/// A chosen option on an order product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductOption {
    pub id: i64,
    pub option_id: i64,
    pub order_product_id: i64,
    pub product_option_id: i64,
    pub display_name: String,
    pub display_value: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub display_style: String,
}

/// Where (part of) an order ships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderShippingAddress {
    pub id: i64,
    pub order_id: OrderId,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub street_1: String,
    pub street_2: String,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub country_iso2: String,
    pub state: String,
    pub email: String,
    pub phone: String,
    pub items_total: i64,
    pub items_shipped: i64,
    pub shipping_method: String,
    pub base_cost: Decimal,
    pub cost_ex_tax: Decimal,
    pub cost_inc_tax: Decimal,
    pub cost_tax: Decimal,
    pub base_handling_cost: Decimal,
    pub handling_cost_ex_tax: Decimal,
    pub handling_cost_inc_tax: Decimal,
    pub handling_cost_tax: Decimal,
    pub shipping_zone_id: i64,
    pub shipping_zone_name: String,
    pub form_fields: Vec<serde_json::Value>,
}

/// A coupon redeemed on an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderCoupon {
    pub id: i64,
    pub coupon_id: CouponId,
    pub order_id: OrderId,
    pub code: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: i64,
    pub discount: Decimal,
}

/// Order list filters. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilters {
    pub customer_id: Option<CustomerId>,
    pub status_id: Option<i64>,
    pub email: Option<String>,
    pub cart_id: Option<String>,
    pub min_date_created: Option<String>,
    pub max_date_created: Option<String>,
    pub min_id: Option<OrderId>,
    pub max_id: Option<OrderId>,
    pub channel_id: Option<ChannelId>,
    /// e.g. `date_created:desc`.
    pub sort: Option<String>,
}

impl OrderFilters {
    /// Orders of one customer.
    #[must_use]
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Self::default()
        }
    }

    /// Set filters as query pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key, value));
            }
        };
        push("customer_id", self.customer_id.map(|id| id.to_string()));
        push("status_id", self.status_id.map(|id| id.to_string()));
        push("email", self.email.clone());
        push("cart_id", self.cart_id.clone());
        push("min_date_created", self.min_date_created.clone());
        push("max_date_created", self.max_date_created.clone());
        push("min_id", self.min_id.map(|id| id.to_string()));
        push("max_id", self.max_id.map(|id| id.to_string()));
        push("channel_id", self.channel_id.map(|id| id.to_string()));
        push("sort", self.sort.clone());
        pairs
    }
}

/// Accept an embedded array, and treat a `{url, resource}` link as empty.
fn resource_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_json::Value::deserialize(deserializer)? {
        value @ serde_json::Value::Array(_) => serde_json::from_value(value).map_err(de::Error::custom),
        _ => Ok(Vec::new()),
    }
}

impl Client {
    /// Get orders matching `filters` in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    /// No matching orders is `Ok(vec![])`.
    #[instrument(skip(self))]
    pub async fn get_orders(&self, filters: &OrderFilters) -> Result<Vec<Order>, BigCommerceError> {
        let pairs = filters.query_pairs();
        let query: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        match self.get_json(ORDERS, &query).await {
            Err(BigCommerceError::NoContent) => Ok(Vec::new()),
            result => result,
        }
    }

    /// Get one page of orders matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_orders_page(
        &self,
        filters: &OrderFilters,
        page: u32,
    ) -> Result<PageResult<Order>, BigCommerceError> {
        let pairs = filters.query_pairs();
        let query: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.get_v2_page(ORDERS, &query, page).await
    }

    /// Get every order matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the orders fetched so far.
    #[instrument(skip(self))]
    pub async fn get_all_orders(
        &self,
        filters: &OrderFilters,
    ) -> Result<Vec<Order>, IncompleteFetch<Order, BigCommerceError>> {
        let pairs = filters.query_pairs();
        let query: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.get_all_v2(ORDERS, &query).await
    }

    /// Get an order with its products, shipping addresses and coupons.
    ///
    /// Sub-resources are filled best-effort in that order: the first one
    /// that fails is logged and it and the remaining ones are left empty.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, BigCommerceError> {
        let mut order: Order = self.get_json(&format!("{ORDERS}/{id}"), &[]).await?;

        match self.get_order_products(id).await {
            Ok(products) => order.products = products,
            Err(e) => {
                warn!(error = %e, "Order products unavailable");
                return Ok(order);
            }
        }
        match self.get_order_shipping_addresses(id).await {
            Ok(addresses) => order.shipping_addresses = addresses,
            Err(e) => {
                warn!(error = %e, "Order shipping addresses unavailable");
                return Ok(order);
            }
        }
        match self.get_order_coupons(id).await {
            Ok(coupons) => order.coupons = coupons,
            Err(e) => warn!(error = %e, "Order coupons unavailable"),
        }
        Ok(order)
    }

    /// Get the products of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_order_products(&self, id: OrderId) -> Result<Vec<OrderProduct>, BigCommerceError> {
        self.get_order_list(id, "products").await
    }

    /// Get the shipping addresses of an order.
    ///
    /// Shipping quotes are not decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_order_shipping_addresses(
        &self,
        id: OrderId,
    ) -> Result<Vec<OrderShippingAddress>, BigCommerceError> {
        self.get_order_list(id, "shipping_addresses").await
    }

    /// Get the coupons redeemed on an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_order_coupons(&self, id: OrderId) -> Result<Vec<OrderCoupon>, BigCommerceError> {
        self.get_order_list(id, "coupons").await
    }

    async fn get_order_list<T: DeserializeOwned>(
        &self,
        id: OrderId,
        resource: &str,
    ) -> Result<Vec<T>, BigCommerceError> {
        match self.get_json(&format!("{ORDERS}/{id}/{resource}"), &[]).await {
            Err(BigCommerceError::NoContent) => Ok(Vec::new()),
            result => result,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_order_with_resource_links_decodes() {
        let body = r#"{
            "id": 100, "customer_id": 41, "status_id": 11, "status": "Awaiting Fulfillment",
            "subtotal_ex_tax": "45.0000", "total_inc_tax": "49.9500", "items_total": 2,
            "date_shipped": null, "currency_code": "USD", "currency_exchange_rate": "1.0000000000",
            "billing_address": {"first_name": "Jane", "street_1": "1 Main St", "country_iso2": "US"},
            "products": {"url": "https://api.bigcommerce.com/stores/abc/v2/orders/100/products",
                         "resource": "/orders/100/products"},
            "shipping_addresses": {"url": "x", "resource": "/orders/100/shipping_addresses"},
            "coupons": {"url": "x", "resource": "/orders/100/coupons"}
        }"#;
        let order: Order = serde_json::from_str(body).unwrap();
        assert_eq!(order.total_inc_tax, Decimal::from_str("49.95").unwrap());
        assert_eq!(order.billing_address.street_1, "1 Main St");
        assert!(order.products.is_empty());
        assert!(order.date_shipped.is_empty());
    }

    #[test]
    fn test_order_products_decode() {
        let body = r#"[{
            "id": 5, "order_id": 100, "product_id": 77, "name": "Orbit Terrarium",
            "type": "physical", "base_price": "22.5000", "quantity": 2,
            "parent_order_product_id": null,
            "applied_discounts": [{"id": "coupon", "amount": "2.5000", "name": "SPRING", "code": null, "target": "order"}],
            "product_options": []
        }]"#;
        let products: Vec<OrderProduct> = serde_json::from_str(body).unwrap();
        assert_eq!(products[0].kind, "physical");
        assert_eq!(products[0].applied_discounts[0].code, None);
        assert_eq!(products[0].base_price, Decimal::from_str("22.5").unwrap());
    }

    #[test]
    fn test_filters_skip_unset() {
        let filters = OrderFilters {
            sort: Some("date_created:desc".into()),
            ..OrderFilters::for_customer(CustomerId::new(41))
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("customer_id", "41".to_string()),
                ("sort", "date_created:desc".to_string()),
            ]
        );
        assert!(OrderFilters::default().query_pairs().is_empty());
    }
}
