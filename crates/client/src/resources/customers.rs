//! Customer accounts (`/v3/customers`).

use bigcommerce_core::{ChannelId, CustomerGroupId, CustomerId};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::Address;
use crate::client::Client;
use crate::error::BigCommerceError;

const CUSTOMERS: &str = "v3/customers";
const FORM_FIELD_VALUES: &str = "v3/customers/form-field-values";

/// A customer account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub id: CustomerId,
    pub company: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub form_fields: Vec<FormField>,
    pub date_created: String,
    pub date_modified: String,
    pub store_credit_amounts: Vec<StoreCredit>,
    pub registration_ip_address: String,
    pub customer_group_id: CustomerGroupId,
    pub notes: String,
    pub tax_exempt_category: String,
    pub accepts_product_review_abandoned_cart_emails: bool,
    pub origin_channel_id: ChannelId,
    pub channel_ids: Option<Vec<ChannelId>>,
    pub addresses: Vec<Address>,
}

/// New account details.
///
/// `origin_channel_id` and `channel_ids` default to the client's channel.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateAccountPayload {
    pub company: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    pub tax_exempt_category: String,
    pub customer_group_id: CustomerGroupId,
    pub addresses: Vec<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
    pub accepts_product_review_abandoned_cart_emails: bool,
    pub store_credit_amounts: Vec<StoreCredit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_channel_id: Option<ChannelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_ids: Option<Vec<ChannelId>>,
}

/// Changes to an existing account. `id` is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SaveAccountPayload {
    pub id: CustomerId,
    pub company: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    pub tax_exempt_category: String,
    pub customer_group_id: CustomerGroupId,
    pub addresses: Vec<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
    pub accepts_product_review_abandoned_cart_emails: bool,
    pub store_credit_amounts: Vec<StoreCredit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_channel_id: Option<ChannelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_ids: Option<Vec<ChannelId>>,
    pub form_fields: Vec<FormField>,
}

/// Store credit entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCredit {
    pub amount: f64,
}

/// Password settings for a new or updated account.
#[derive(Clone, Serialize)]
pub struct Authentication {
    pub force_password_reset: bool,
    #[serde(serialize_with = "expose_password")]
    pub new_password: SecretString,
}

impl Authentication {
    /// Set a password without forcing a reset.
    #[must_use]
    pub const fn new(new_password: SecretString) -> Self {
        Self {
            force_password_reset: false,
            new_password,
        }
    }
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authentication")
            .field("force_password_reset", &self.force_password_reset)
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

fn expose_password<S: serde::Serializer>(password: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(password.expose_secret())
}

/// A customer form field value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    #[serde(skip_serializing_if = "CustomerId::is_unset")]
    pub customer_id: CustomerId,
    pub name: String,
    pub value: String,
}

#[derive(Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    channel_id: ChannelId,
}

#[derive(Deserialize)]
struct CredentialsResponse {
    #[serde(default)]
    is_valid: bool,
    #[serde(default)]
    customer_id: CustomerId,
}

fn first_customer(customers: Vec<Customer>) -> Result<Customer, BigCommerceError> {
    customers
        .into_iter()
        .next()
        .ok_or_else(|| BigCommerceError::MalformedData("no customer returned".to_string()))
}

impl Client {
    /// Check a storefront login.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if the credentials are not valid.
    #[instrument(skip(self, password))]
    pub async fn validate_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<CustomerId, BigCommerceError> {
        let request = CredentialsRequest {
            email,
            password: password.expose_secret(),
            channel_id: self.config().channel_id,
        };
        let response: CredentialsResponse = self
            .send_json(
                Method::POST,
                &format!("{CUSTOMERS}/validate-credentials"),
                &[],
                &request,
            )
            .await?;
        if !response.is_valid {
            return Err(BigCommerceError::NotFound);
        }
        Ok(response.customer_id)
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Unprocessable` with the field errors if
    /// BigCommerce rejects the payload (e.g. the email is taken).
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn create_account(&self, mut payload: CreateAccountPayload) -> Result<Customer, BigCommerceError> {
        let channel_id = self.config().channel_id;
        payload.origin_channel_id.get_or_insert(channel_id);
        payload.channel_ids.get_or_insert_with(|| vec![channel_id]);

        let customers: Vec<Customer> = self
            .send_data(Method::POST, CUSTOMERS, &[], &[payload])
            .await?;
        first_customer(customers)
    }

    /// Update a customer account.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MissingField` if `payload.id` is unset, or
    /// `BigCommerceError::Unprocessable` if BigCommerce rejects the payload.
    #[instrument(skip(self, payload), fields(customer_id = %payload.id))]
    pub async fn save_account(&self, mut payload: SaveAccountPayload) -> Result<Customer, BigCommerceError> {
        if payload.id.is_unset() {
            return Err(BigCommerceError::MissingField("id"));
        }
        let channel_id = self.config().channel_id;
        payload.origin_channel_id.get_or_insert(channel_id);
        payload.channel_ids.get_or_insert_with(|| vec![channel_id]);

        let customers: Vec<Customer> = self
            .send_data(Method::PUT, CUSTOMERS, &[], &[payload])
            .await?;
        first_customer(customers)
    }

    /// Set form field values on a customer.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MissingField` if `customer_id` is unset.
    #[instrument(skip(self, fields), fields(count = fields.len()))]
    pub async fn set_form_fields(
        &self,
        customer_id: CustomerId,
        fields: &[FormField],
    ) -> Result<(), BigCommerceError> {
        if customer_id.is_unset() {
            return Err(BigCommerceError::MissingField("customer_id"));
        }
        let fields: Vec<FormField> = fields
            .iter()
            .cloned()
            .map(|field| FormField {
                customer_id,
                ..field
            })
            .collect();
        self.send_empty(Method::PUT, FORM_FIELD_VALUES, &[], Some(&fields))
            .await
    }

    /// Get a customer's form field values.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_form_fields(&self, customer_id: CustomerId) -> Result<Vec<FormField>, BigCommerceError> {
        let id = customer_id.to_string();
        let fields: Vec<FormField> = self
            .get_data(FORM_FIELD_VALUES, &[("customer_id", id.as_str())])
            .await?;
        debug!(count = fields.len(), "Fetched form fields");
        Ok(fields)
    }

    /// Get a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if no customer has that id.
    #[instrument(skip(self))]
    pub async fn get_customer_by_id(&self, customer_id: CustomerId) -> Result<Customer, BigCommerceError> {
        let id = customer_id.to_string();
        self.find_customer(&[("id:in", id.as_str())]).await
    }

    /// Get a customer by email address.
    ///
    /// Emails are not unique across channels; the first match is returned.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if no customer has that email.
    #[instrument(skip(self))]
    pub async fn get_customer_by_email(&self, email: &str) -> Result<Customer, BigCommerceError> {
        self.find_customer(&[("email:in", email)]).await
    }

    async fn find_customer(&self, query: &[(&str, &str)]) -> Result<Customer, BigCommerceError> {
        let customers: Vec<Customer> = self.get_data(CUSTOMERS, query).await?;
        customers.into_iter().next().ok_or(BigCommerceError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payload_serializes_password() {
        let payload = CreateAccountPayload {
            email: "jane@example.com".into(),
            authentication: Some(Authentication::new(SecretString::from("Correct-Horse-9"))),
            ..CreateAccountPayload::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["authentication"]["new_password"], "Correct-Horse-9");
        assert!(value.get("origin_channel_id").is_none());
        assert!(!format!("{payload:?}").contains("Correct-Horse-9"));
    }

    #[test]
    fn test_form_field_omits_unset_customer() {
        let field = FormField {
            name: "Newsletter".into(),
            value: "yes".into(),
            ..FormField::default()
        };
        let value = serde_json::to_value(&field).unwrap();
        assert!(value.get("customer_id").is_none());
    }

    #[test]
    fn test_customer_decodes() {
        let customer: Customer = serde_json::from_str(
            r#"{"id": 11, "email": "jane@example.com", "first_name": "Jane",
                "customer_group_id": 2, "channel_ids": null,
                "addresses": [{"id": 4, "customer_id": 11, "city": "Austin", "country_code": "US"}]}"#,
        )
        .unwrap();
        assert_eq!(customer.id, CustomerId::new(11));
        assert_eq!(customer.addresses[0].city, "Austin");
        assert!(customer.channel_ids.is_none());
    }

    #[test]
    fn test_first_customer_empty() {
        assert!(matches!(
            first_customer(Vec::new()),
            Err(BigCommerceError::MalformedData(_))
        ));
    }
}
