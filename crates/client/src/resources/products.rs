//! Catalog products, their images and metafields.

use std::collections::HashMap;

use bigcommerce_core::{BrandId, CategoryId, ImageId, MetafieldId, ProductId, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{CustomUrl, nullable};
use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};

/// A catalog product.
///
/// Listings only carry the fields selected by the client's product
/// `include_fields`; everything else decodes to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// `physical` or `digital`.
    #[serde(rename = "type")]
    pub kind: String,
    pub sku: String,
    pub description: String,
    pub weight: f64,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub price: f64,
    pub cost_price: f64,
    pub retail_price: f64,
    pub sale_price: f64,
    pub map_price: f64,
    pub calculated_price: f64,
    pub tax_class_id: i64,
    pub product_tax_code: String,
    pub categories: Vec<CategoryId>,
    pub brand_id: BrandId,
    pub inventory_level: i64,
    pub inventory_warning_level: i64,
    pub inventory_tracking: String,
    pub total_sold: i64,
    pub fixed_cost_shipping_price: f64,
    pub is_free_shipping: bool,
    pub is_visible: bool,
    pub is_featured: bool,
    pub related_products: Vec<i64>,
    pub warranty: String,
    pub bin_picking_number: String,
    pub upc: String,
    pub mpn: String,
    pub gtin: String,
    pub search_keywords: String,
    pub availability: String,
    pub availability_description: String,
    pub sort_order: i64,
    pub condition: String,
    pub is_condition_shown: bool,
    pub order_quantity_minimum: i64,
    pub order_quantity_maximum: i64,
    pub page_title: String,
    pub meta_keywords: Vec<String>,
    pub meta_description: String,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub view_count: i64,
    #[serde(deserialize_with = "nullable")]
    pub preorder_message: String,
    pub is_preorder_only: bool,
    pub is_price_hidden: bool,
    pub price_hidden_label: String,
    pub custom_url: CustomUrl,
    pub base_variant_id: Option<VariantId>,
    pub open_graph_type: String,
    pub open_graph_title: String,
    pub open_graph_description: String,
    pub variants: Vec<Variant>,
    pub images: Vec<ProductImage>,
    pub custom_fields: Vec<CustomField>,
    pub primary_image: Option<serde_json::Value>,
    pub videos: Vec<serde_json::Value>,
    pub bulk_pricing_rules: Vec<serde_json::Value>,
    pub options: Vec<serde_json::Value>,
    pub modifiers: Vec<serde_json::Value>,
}

/// A purchasable variant of a product (`include=variants`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub price: Option<f64>,
    pub calculated_price: f64,
    pub sale_price: Option<f64>,
    pub retail_price: Option<f64>,
    pub map_price: Option<f64>,
    pub weight: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
    pub is_free_shipping: bool,
    pub fixed_cost_shipping_price: Option<f64>,
    pub calculated_weight: f64,
    pub purchasing_disabled: bool,
    pub purchasing_disabled_message: String,
    pub image_url: String,
    pub cost_price: Option<f64>,
    pub upc: String,
    pub mpn: String,
    pub gtin: String,
    pub inventory_level: i64,
    pub inventory_warning_level: i64,
    pub bin_picking_number: String,
    pub option_values: Vec<serde_json::Value>,
}

/// A merchant-defined name/value pair shown on the product page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomField {
    pub id: i64,
    pub name: String,
    pub value: String,
}

/// Key/value data attached to a product by an app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metafield {
    pub id: MetafieldId,
    pub key: String,
    pub value: String,
    pub resource_id: i64,
    pub resource_type: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub namespace: String,
    pub permission_set: String,
}

/// A product image in its stock sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductImage {
    pub id: ImageId,
    pub product_id: ProductId,
    pub is_thumbnail: bool,
    pub sort_order: i64,
    pub description: String,
    pub image_file: String,
    pub url_zoom: String,
    pub url_standard: String,
    pub url_thumbnail: String,
    pub url_tiny: String,
    pub date_modified: Option<DateTime<Utc>>,
}

const PRODUCTS: &str = "v3/catalog/products";

impl Client {
    /// Get one page of products, using the client's product field filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_products(&self, page: u32) -> Result<PageResult<Product>, BigCommerceError> {
        let filters = &self.config().catalog.products;
        let query: Vec<_> = filters.query_pairs().collect();
        self.get_page(PRODUCTS, &query, page).await
    }

    /// Get every product, page by page.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the products fetched so far if a page
    /// cannot be fetched within the retry budget.
    #[instrument(skip(self))]
    pub async fn get_all_products(&self) -> Result<Vec<Product>, IncompleteFetch<Product, BigCommerceError>> {
        self.paginator()
            .fetch_all(|page| self.get_products(page))
            .await
    }

    /// Get a single product with all fields.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, BigCommerceError> {
        self.get_data(&format!("{PRODUCTS}/{id}"), &[]).await
    }

    /// Get a product's metafields keyed by `key`.
    ///
    /// When several namespaces use the same key the last one wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_metafields(
        &self,
        id: ProductId,
    ) -> Result<HashMap<String, Metafield>, BigCommerceError> {
        let metafields: Vec<Metafield> = self
            .get_data(&format!("{PRODUCTS}/{id}/metafields"), &[])
            .await?;
        Ok(metafields
            .into_iter()
            .map(|m| (m.key.clone(), m))
            .collect())
    }

    /// Get a product's images.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_images(&self, id: ProductId) -> Result<Vec<ProductImage>, BigCommerceError> {
        self.get_data(&format!("{PRODUCTS}/{id}/images"), &[]).await
    }

    /// URL of the image flagged as the product's thumbnail.
    ///
    /// Product listings do not carry it, so the images are fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the images cannot be fetched.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_main_thumbnail_url(&self, id: ProductId) -> Result<Option<String>, BigCommerceError> {
        let images = self.get_product_images(id).await?;
        let thumbnail = main_thumbnail(&images);
        if thumbnail.is_none() {
            debug!(count = images.len(), "Product has no thumbnail image");
        }
        Ok(thumbnail.map(str::to_owned))
    }
}

fn main_thumbnail(images: &[ProductImage]) -> Option<&str> {
    images
        .iter()
        .find(|image| image.is_thumbnail)
        .map(|image| image.url_thumbnail.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bigcommerce_core::Envelope;

    use super::*;

    #[test]
    fn test_sparse_product_listing_decodes() {
        let body = r#"{
            "data": [
                {"id": 77, "name": "Orbit Terrarium", "sku": "OTS", "price": 89.5,
                 "is_visible": true, "custom_url": {"url": "/orbit-terrarium/", "is_customized": false}}
            ],
            "meta": {"pagination": {"total": 1, "count": 1, "per_page": 250,
                     "current_page": 1, "total_pages": 1, "links": {"current": "?page=1"}}}
        }"#;
        let envelope: Envelope<Vec<Product>> = serde_json::from_str(body).unwrap();
        let page = PageResult::from_envelope(envelope);
        assert!(!page.has_more);

        let product = &page.items[0];
        assert_eq!(product.id, ProductId::new(77));
        assert_eq!(product.custom_url.url, "/orbit-terrarium/");
        assert!(product.variants.is_empty());
    }

    #[test]
    fn test_full_product_decodes() {
        let body = r#"{
            "id": 111, "name": "Smith Journal", "type": "physical", "sku": "SM-13",
            "weight": 0, "price": 25, "categories": [23, 21], "brand_id": 0,
            "meta_keywords": [], "preorder_message": null, "base_variant_id": 110,
            "date_created": "2018-08-15T14:48:46+00:00",
            "variants": [{"id": 110, "product_id": 111, "sku": "SM-13", "price": null,
                          "calculated_price": 25, "option_values": []}],
            "custom_fields": [{"id": 4, "name": "ISBN", "value": "1234567890"}]
        }"#;
        let product: Product = serde_json::from_str(body).unwrap();
        assert_eq!(product.categories, vec![CategoryId::new(23), CategoryId::new(21)]);
        assert_eq!(product.preorder_message, "");
        assert_eq!(product.variants[0].price, None);
        assert_eq!(product.custom_fields[0].name, "ISBN");
        assert!(product.date_created.is_some());
    }

    #[test]
    fn test_main_thumbnail() {
        let images = vec![
            ProductImage {
                url_thumbnail: "https://cdn/a.jpg".into(),
                ..ProductImage::default()
            },
            ProductImage {
                is_thumbnail: true,
                url_thumbnail: "https://cdn/b.jpg".into(),
                ..ProductImage::default()
            },
        ];
        assert_eq!(main_thumbnail(&images), Some("https://cdn/b.jpg"));
        assert_eq!(main_thumbnail(&images[..1]), None);
    }
}
