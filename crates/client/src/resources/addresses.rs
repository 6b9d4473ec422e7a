//! Customer addresses (`/v3/customers/addresses`).

use bigcommerce_core::{AddressId, CustomerId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::FormField;
use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};

const ADDRESSES: &str = "v3/customers/addresses";

/// A customer address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(skip_serializing_if = "AddressId::is_unset")]
    pub id: AddressId,
    #[serde(skip_serializing_if = "CustomerId::is_unset")]
    pub customer_id: CustomerId,
    pub address1: String,
    pub address2: String,
    /// `residential` or `commercial`.
    pub address_type: String,
    pub city: String,
    pub company: String,
    #[serde(skip_serializing)]
    pub country: String,
    pub country_code: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub postal_code: String,
    pub state_or_province: String,
    pub form_fields: Vec<FormField>,
}

fn first_address(addresses: Vec<Address>) -> Result<Address, BigCommerceError> {
    addresses
        .into_iter()
        .next()
        .ok_or_else(|| BigCommerceError::MalformedData("no address returned".to_string()))
}

impl Client {
    /// Get one page of a customer's addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_addresses(
        &self,
        customer_id: CustomerId,
        page: u32,
    ) -> Result<PageResult<Address>, BigCommerceError> {
        let id = customer_id.to_string();
        self.get_page(ADDRESSES, &[("customer_id:in", id.as_str())], page)
            .await
    }

    /// Get every address of a customer.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the addresses fetched so far.
    #[instrument(skip(self))]
    pub async fn get_all_addresses(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, IncompleteFetch<Address, BigCommerceError>> {
        self.paginator()
            .fetch_all(|page| self.get_addresses(customer_id, page))
            .await
    }

    /// Add an address to a customer. Any id on `address` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MalformedData` if the response holds no address.
    #[instrument(skip(self, address))]
    pub async fn create_address(
        &self,
        customer_id: CustomerId,
        address: &Address,
    ) -> Result<Address, BigCommerceError> {
        let address = Address {
            id: AddressId::default(),
            customer_id,
            ..address.clone()
        };
        let created: Vec<Address> = self
            .send_data(Method::POST, ADDRESSES, &[], &[address])
            .await?;
        first_address(created)
    }

    /// Update one of a customer's addresses.
    ///
    /// The address is always written against `customer_id`, whatever
    /// `address.customer_id` holds.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MissingField` if the address has no id.
    #[instrument(skip(self, address), fields(address_id = %address.id))]
    pub async fn update_address(
        &self,
        customer_id: CustomerId,
        address: &Address,
    ) -> Result<Address, BigCommerceError> {
        if address.id.is_unset() {
            return Err(BigCommerceError::MissingField("address.id"));
        }
        let address = Address {
            customer_id,
            ..address.clone()
        };
        let updated: Vec<Address> = self
            .send_data(Method::PUT, ADDRESSES, &[], &[address])
            .await?;
        first_address(updated)
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, address_id: AddressId) -> Result<(), BigCommerceError> {
        let id = address_id.to_string();
        self.delete(ADDRESSES, &[("id:in", id.as_str())]).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_address_serializes_without_ids() {
        let address = Address {
            address1: "1 Main St".into(),
            city: "Austin".into(),
            country: "United States".into(),
            country_code: "US".into(),
            ..Address::default()
        };
        let value = serde_json::to_value(&address).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("customer_id").is_none());
        assert!(value.get("country").is_none());
        assert_eq!(value["country_code"], "US");
    }

    #[test]
    fn test_address_page_decodes() {
        let body = r#"{"data": [{"id": 1, "customer_id": 9, "first_name": "Jo", "country": "Canada"}],
                       "meta": {"pagination": {"total": 3, "count": 1, "per_page": 1,
                                "current_page": 1, "total_pages": 3}}}"#;
        let envelope: bigcommerce_core::Envelope<Vec<Address>> = serde_json::from_str(body).unwrap();
        let page = PageResult::from_envelope(envelope);
        assert!(page.has_more);
        assert_eq!(page.items[0].country, "Canada");
    }
}
