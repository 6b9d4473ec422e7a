//! Catalog brands (`/v3/catalog/brands`).

use bigcommerce_core::BrandId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::CustomUrl;
use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};

/// A product brand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub page_title: String,
    pub meta_keywords: Vec<String>,
    pub meta_description: String,
    pub image_url: String,
    pub search_keywords: String,
    pub custom_url: CustomUrl,
}

impl Client {
    /// Get one page of brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_brands(&self, page: u32) -> Result<PageResult<Brand>, BigCommerceError> {
        self.get_page("v3/catalog/brands", &[], page).await
    }

    /// Get every brand.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the brands fetched so far.
    #[instrument(skip(self))]
    pub async fn get_all_brands(&self) -> Result<Vec<Brand>, IncompleteFetch<Brand, BigCommerceError>> {
        self.paginator()
            .fetch_all(|page| self.get_brands(page))
            .await
    }
}
