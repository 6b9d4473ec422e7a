//! Stock adjustments (`/v3/inventory/adjustments`).

use bigcommerce_core::{LocationId, ProductId, VariantId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::error::BigCommerceError;

/// A batch of stock changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustment {
    /// Shown in the inventory history.
    pub reason: String,
    pub items: Vec<AdjustmentItem>,
}

/// Stock change for one item at one location.
///
/// The item is identified by `variant_id`, `sku` or `product_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentItem {
    pub location_id: LocationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Delta for relative adjustments, new level for absolute ones.
    pub quantity: i64,
}

impl AdjustmentItem {
    const fn is_identified(&self) -> bool {
        self.variant_id.is_some() || self.sku.is_some() || self.product_id.is_some()
    }
}

impl Adjustment {
    fn validate(&self) -> Result<(), BigCommerceError> {
        if self.items.iter().any(|item| !item.is_identified()) {
            return Err(BigCommerceError::MissingField("variant_id, sku or product_id"));
        }
        Ok(())
    }
}

impl Client {
    /// Change stock levels by the given deltas.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MissingField` if an item names no product,
    /// variant or SKU.
    #[instrument(skip(self, adjustment), fields(items = adjustment.items.len()))]
    pub async fn adjust_inventory_relative(&self, adjustment: &Adjustment) -> Result<(), BigCommerceError> {
        self.adjust_inventory("relative", adjustment).await
    }

    /// Set stock levels to the given values.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MissingField` if an item names no product,
    /// variant or SKU.
    #[instrument(skip(self, adjustment), fields(items = adjustment.items.len()))]
    pub async fn adjust_inventory_absolute(&self, adjustment: &Adjustment) -> Result<(), BigCommerceError> {
        self.adjust_inventory("absolute", adjustment).await
    }

    async fn adjust_inventory(&self, mode: &str, adjustment: &Adjustment) -> Result<(), BigCommerceError> {
        adjustment.validate()?;
        self.send_empty(
            Method::POST,
            &format!("v3/inventory/adjustments/{mode}"),
            &[],
            Some(adjustment),
        )
        .await
    }
}
