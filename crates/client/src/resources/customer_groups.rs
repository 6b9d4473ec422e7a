//! Customer groups (`/v2/customer_groups`).

use bigcommerce_core::{CategoryId, CustomerGroupId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::error::BigCommerceError;

/// A customer group with its pricing rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerGroup {
    pub id: CustomerGroupId,
    pub name: String,
    pub is_default: bool,
    pub category_access: CategoryAccess,
    pub discount_rules: Vec<DiscountRule>,
    pub is_group_for_guests: bool,
}

/// Which categories a group may browse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryAccess {
    /// `all`, `specific` or `none`.
    #[serde(rename = "type")]
    pub kind: String,
    pub categories: Vec<CategoryId>,
}

/// A group discount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountRule {
    /// `all`, `category`, `product` or `price_list`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `percent`, `fixed` or `price`.
    pub method: String,
    pub amount: Decimal,
    pub price_list_id: i64,
}

impl Client {
    /// Get the store's customer groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_customer_groups(&self) -> Result<Vec<CustomerGroup>, BigCommerceError> {
        match self.get_json("v2/customer_groups", &[]).await {
            Err(BigCommerceError::NoContent) => Ok(Vec::new()),
            result => result,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_group_decodes() {
        let groups: Vec<CustomerGroup> = serde_json::from_str(
            r#"[{"id": 2, "name": "Wholesale", "category_access": {"type": "specific", "categories": [18, 23]},
                 "discount_rules": [{"type": "all", "method": "percent", "amount": "12.5000"}]}]"#,
        )
        .unwrap();
        assert_eq!(groups[0].category_access.categories, vec![CategoryId::new(18), CategoryId::new(23)]);
        assert_eq!(groups[0].discount_rules[0].method, "percent");
    }
}
