//! Request and response types for each BigCommerce resource, and the
//! [`Client`](crate::Client) operations that use them.
//!
//! v3 endpoints wrap payloads in a `{data, meta}` envelope; v2 endpoints
//! return bare JSON and carry money as decimal strings.

use serde::{Deserialize, Deserializer, Serialize};

pub mod addresses;
pub mod brands;
pub mod carts;
pub mod categories;
pub mod channels;
pub mod coupons;
pub mod currencies;
pub mod customer_groups;
pub mod customers;
pub mod inventory;
pub mod locations;
pub mod orders;
pub mod posts;
pub mod products;
pub mod scripts;
pub mod store;
pub mod themes;
pub mod webhooks;
pub mod widgets;

pub use addresses::Address;
pub use brands::Brand;
pub use carts::{Cart, CartCoupon, CartCurrency, CartLineItems, Discount, LineItem, RedirectUrls};
pub use categories::{Category, CategoryNode, CategoryTree};
pub use channels::Channel;
pub use coupons::{AppliesTo, Coupon, CouponFilters};
pub use currencies::Currency;
pub use customer_groups::{CategoryAccess, CustomerGroup, DiscountRule};
pub use customers::{
    Authentication, CreateAccountPayload, Customer, FormField, SaveAccountPayload, StoreCredit,
};
pub use inventory::{Adjustment, AdjustmentItem};
pub use locations::{
    DayHours, GeoCoordinates, Location, LocationAddress, LocationFilters, OperatingHours,
    SpecialHours,
};
pub use orders::{
    AppliedDiscount, Order, OrderAddress, OrderCoupon, OrderFilters, OrderProduct,
    OrderShippingAddress, ProductOption,
};
pub use posts::Post;
pub use products::{CustomField, Metafield, Product, ProductImage, Variant};
pub use scripts::Script;
pub use store::{DateFormat, StoreFeatures, StoreInfo, Timezone};
pub use themes::{Theme, ThemeConfig, ThemeVariation};
pub use webhooks::{
    InventoryChange, OrderMessage, SkuRef, StatusChange, Webhook, WebhookAddress, WebhookData,
    WebhookPayload,
};
pub use widgets::WidgetTemplate;

/// A storefront URL that may have been customized by the merchant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomUrl {
    /// Relative storefront path.
    pub url: String,
    /// Whether the merchant edited the generated path.
    pub is_customized: bool,
}

/// Deserialize `null` as the type's default.
///
/// BigCommerce sends `null` for many unset scalars, which `#[serde(default)]`
/// alone does not cover.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render ids as the comma-separated list `:in` filters expect.
pub(crate) fn id_list<I: std::fmt::Display>(ids: impl IntoIterator<Item = I>) -> String {
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "nullable")]
        name: String,
    }

    #[test]
    fn test_nullable_field() {
        let sample: Sample = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(sample.name, "");
        let sample: Sample = serde_json::from_str("{}").unwrap();
        assert_eq!(sample.name, "");
        let sample: Sample = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(sample.name, "x");
    }

    #[test]
    fn test_id_list() {
        assert_eq!(id_list([1, 2, 3]), "1,2,3");
        assert_eq!(id_list(Vec::<i64>::new()), "");
    }
}
