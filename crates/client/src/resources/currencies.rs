//! Store currencies (`/v2/currencies`).

use bigcommerce_core::CurrencyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::error::BigCommerceError;

/// A currency the store displays or transacts in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Currency {
    pub id: CurrencyId,
    pub is_default: bool,
    pub last_updated: String,
    pub country_iso2: String,
    pub default_for_country_codes: Vec<String>,
    pub currency_code: String,
    /// Rate against the default currency.
    pub currency_exchange_rate: Decimal,
    pub name: String,
    /// Symbol such as `$`.
    pub token: String,
    pub auto_update: bool,
    /// `left` or `right`.
    pub token_location: String,
    pub decimal_token: String,
    pub thousands_token: String,
    pub decimal_places: u32,
    pub enabled: bool,
    pub is_transactional: bool,
    pub use_default_name: bool,
}

impl Client {
    /// Get the store's currencies.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_currencies(&self) -> Result<Vec<Currency>, BigCommerceError> {
        self.get_json("v2/currencies", &[]).await
    }
}
