//! Inventory locations (`/v3/inventory/locations`).

use bigcommerce_core::LocationId;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::id_list;
use crate::client::Client;
use crate::error::BigCommerceError;

const LOCATIONS: &str = "v3/inventory/locations";

/// A physical location that holds stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Assigned by BigCommerce; required when updating.
    #[serde(skip_serializing_if = "LocationId::is_unset")]
    pub id: LocationId,
    pub code: String,
    pub label: String,
    pub description: String,
    pub managed_by_external_source: bool,
    /// `PHYSICAL` or `VIRTUAL`.
    pub type_id: String,
    pub enabled: bool,
    pub operating_hours: OperatingHours,
    pub time_zone: String,
    pub address: LocationAddress,
    pub storefront_visibility: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub special_hours: Vec<SpecialHours>,
}

/// Street address of a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationAddress {
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub email: String,
    pub phone: String,
    pub geo_coordinates: GeoCoordinates,
    pub country_code: String,
}

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Regular opening hours, one entry per weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingHours {
    pub sunday: DayHours,
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
}

/// Opening hours of one day (`HH:MM`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayHours {
    pub open: bool,
    pub opening: String,
    pub closing: String,
}

/// Hours that override the regular ones on a date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialHours {
    pub label: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub open: bool,
    pub opening: String,
    pub closing: String,
    pub all_day: bool,
    /// Repeats every year.
    pub annual: bool,
}

/// Location list filters. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilters {
    pub ids: Vec<LocationId>,
    pub codes: Vec<String>,
    pub type_ids: Vec<String>,
    pub is_active: Option<bool>,
}

impl LocationFilters {
    /// Set filters as query pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.ids.is_empty() {
            pairs.push(("location_id:in", id_list(&self.ids)));
        }
        if !self.codes.is_empty() {
            pairs.push(("location_code:in", self.codes.join(",")));
        }
        if !self.type_ids.is_empty() {
            pairs.push(("type_id:in", self.type_ids.join(",")));
        }
        if let Some(active) = self.is_active {
            pairs.push(("is_active", active.to_string()));
        }
        pairs
    }
}

impl Client {
    /// Get locations matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    /// No matching locations is `Ok(vec![])`.
    #[instrument(skip(self))]
    pub async fn get_locations(&self, filters: &LocationFilters) -> Result<Vec<Location>, BigCommerceError> {
        let pairs = filters.query_pairs();
        let query: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        match self.get_data(LOCATIONS, &query).await {
            Err(BigCommerceError::NoContent) => Ok(Vec::new()),
            result => result,
        }
    }

    /// Create locations.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Unprocessable` if BigCommerce rejects a
    /// location (e.g. a duplicate code).
    #[instrument(skip(self, locations), fields(count = locations.len()))]
    pub async fn create_locations(&self, locations: &[Location]) -> Result<(), BigCommerceError> {
        self.send_empty(Method::POST, LOCATIONS, &[], Some(locations))
            .await
    }

    /// Update locations. Each one needs its `id`.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MissingField` if a location has no id.
    #[instrument(skip(self, locations), fields(count = locations.len()))]
    pub async fn update_locations(&self, locations: &[Location]) -> Result<(), BigCommerceError> {
        if locations.iter().any(|location| location.id.is_unset()) {
            return Err(BigCommerceError::MissingField("location.id"));
        }
        self.send_empty(Method::PUT, LOCATIONS, &[], Some(locations))
            .await
    }
}
