//! Coupon codes (`/v3/coupons`).

use bigcommerce_core::CouponId;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};

const COUPONS: &str = "v3/coupons";

/// A coupon code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coupon {
    #[serde(skip_serializing_if = "CouponId::is_unset")]
    pub id: CouponId,
    pub name: String,
    /// `per_item_discount`, `percentage_discount`, `free_shipping`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Decimal,
    pub min_purchase: Decimal,
    /// RFC 2822 date, empty for no expiry.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expires: String,
    pub enabled: bool,
    pub code: String,
    pub applies_to: AppliesTo,
    #[serde(skip_serializing)]
    pub num_uses: i64,
    pub max_uses: i64,
    pub max_uses_per_customer: i64,
    pub restricted_to: serde_json::Value,
    pub shipping_methods: Option<Vec<String>>,
    #[serde(skip_serializing)]
    pub date_created: String,
}

/// What a coupon applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppliesTo {
    /// `categories` or `products`.
    pub entity: String,
    pub ids: Vec<i64>,
}

/// Coupon list filters. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponFilters {
    pub code: Option<String>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub min_id: Option<CouponId>,
    pub max_id: Option<CouponId>,
}

impl CouponFilters {
    /// Set filters as query pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("code", self.code.clone()),
            ("name", self.name.clone()),
            ("type", self.kind.clone()),
            ("min_id", self.min_id.map(|id| id.to_string())),
            ("max_id", self.max_id.map(|id| id.to_string())),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect()
    }
}

impl Client {
    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Unprocessable` if the code already exists.
    #[instrument(skip(self, coupon), fields(code = %coupon.code))]
    pub async fn create_coupon(&self, coupon: &Coupon) -> Result<Coupon, BigCommerceError> {
        self.send_data(Method::POST, COUPONS, &[], coupon).await
    }

    /// Get a coupon.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if the coupon does not exist.
    #[instrument(skip(self))]
    pub async fn get_coupon(&self, id: CouponId) -> Result<Coupon, BigCommerceError> {
        self.get_data(&format!("{COUPONS}/{id}"), &[]).await
    }

    /// Replace a coupon.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if the coupon does not exist.
    #[instrument(skip(self, coupon))]
    pub async fn update_coupon(&self, id: CouponId, coupon: &Coupon) -> Result<Coupon, BigCommerceError> {
        self.send_data(Method::PUT, &format!("{COUPONS}/{id}"), &[], coupon)
            .await
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if the coupon does not exist.
    #[instrument(skip(self))]
    pub async fn delete_coupon(&self, id: CouponId) -> Result<(), BigCommerceError> {
        self.delete(&format!("{COUPONS}/{id}"), &[]).await
    }

    /// Get one page of coupons matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_coupons(
        &self,
        filters: &CouponFilters,
        page: u32,
    ) -> Result<PageResult<Coupon>, BigCommerceError> {
        let pairs = filters.query_pairs();
        let query: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.get_page(COUPONS, &query, page).await
    }

    /// Get every coupon matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the coupons fetched so far.
    #[instrument(skip(self))]
    pub async fn get_all_coupons(
        &self,
        filters: &CouponFilters,
    ) -> Result<Vec<Coupon>, IncompleteFetch<Coupon, BigCommerceError>> {
        self.paginator()
            .fetch_all(|page| self.get_coupons(filters, page))
            .await
    }
}
