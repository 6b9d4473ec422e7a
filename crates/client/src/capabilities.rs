//! Narrow async traits over groups of client operations.
//!
//! Code that only needs carts can take `&impl CartClient` and be tested
//! against [`crate::mock`] instead of a live store. [`Client`] implements
//! every trait by forwarding to its inherent methods.

use std::collections::BTreeMap;
use std::future::Future;

use bigcommerce_core::{AddressId, CustomerId, ProductId, WebhookId};
use secrecy::SecretString;
use uuid::Uuid;

use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};
use crate::resources::{
    Address, Brand, Cart, Category, Channel, CreateAccountPayload, Customer, FormField, LineItem,
    Post, Product, StoreInfo, Webhook,
};

/// Result of a full collection fetch.
pub type FetchAll<T> = Result<Vec<T>, IncompleteFetch<T, BigCommerceError>>;

/// Store-level information.
pub trait StoreClient: Send + Sync {
    fn get_store_info(&self) -> impl Future<Output = Result<StoreInfo, BigCommerceError>> + Send;

    fn get_channels(&self, page: u32) -> impl Future<Output = Result<PageResult<Channel>, BigCommerceError>> + Send;

    fn get_all_channels(&self) -> impl Future<Output = FetchAll<Channel>> + Send;
}

/// Products, categories and brands.
pub trait CatalogClient: Send + Sync {
    fn get_products(&self, page: u32) -> impl Future<Output = Result<PageResult<Product>, BigCommerceError>> + Send;

    fn get_all_products(&self) -> impl Future<Output = FetchAll<Product>> + Send;

    fn get_product(&self, id: ProductId) -> impl Future<Output = Result<Product, BigCommerceError>> + Send;

    fn get_main_thumbnail_url(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<String>, BigCommerceError>> + Send;

    fn get_categories(&self, page: u32) -> impl Future<Output = Result<PageResult<Category>, BigCommerceError>> + Send;

    fn get_all_categories(&self) -> impl Future<Output = FetchAll<Category>> + Send;

    fn get_brands(&self, page: u32) -> impl Future<Output = Result<PageResult<Brand>, BigCommerceError>> + Send;

    fn get_all_brands(&self) -> impl Future<Output = FetchAll<Brand>> + Send;
}

/// Blog posts.
pub trait BlogClient: Send + Sync {
    fn get_posts(&self, page: u32) -> impl Future<Output = Result<PageResult<Post>, BigCommerceError>> + Send;

    fn get_all_posts(&self) -> impl Future<Output = FetchAll<Post>> + Send;
}

/// Storefront carts.
pub trait CartClient: Send + Sync {
    fn create_cart(&self, items: &[LineItem]) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send;

    fn get_cart(&self, cart_id: Uuid) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send;

    fn cart_add_items(
        &self,
        cart_id: Uuid,
        items: &[LineItem],
    ) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send;

    fn cart_edit_item(
        &self,
        cart_id: Uuid,
        item: &LineItem,
    ) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send;

    /// `Ok(None)` once the cart is empty and gone.
    fn cart_delete_item(
        &self,
        cart_id: Uuid,
        item: &LineItem,
    ) -> impl Future<Output = Result<Option<Cart>, BigCommerceError>> + Send;

    fn cart_update_customer_id(
        &self,
        cart_id: Uuid,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send;

    fn delete_cart(&self, cart_id: Uuid) -> impl Future<Output = Result<(), BigCommerceError>> + Send;
}

/// Customer accounts and logins.
pub trait CustomerClient: Send + Sync {
    /// `Err(NotFound)` for a bad login.
    fn validate_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<CustomerId, BigCommerceError>> + Send;

    fn create_account(
        &self,
        payload: CreateAccountPayload,
    ) -> impl Future<Output = Result<Customer, BigCommerceError>> + Send;

    fn set_form_fields(
        &self,
        customer_id: CustomerId,
        fields: &[FormField],
    ) -> impl Future<Output = Result<(), BigCommerceError>> + Send;

    fn get_form_fields(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<FormField>, BigCommerceError>> + Send;

    fn get_customer_by_id(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Customer, BigCommerceError>> + Send;

    fn get_customer_by_email(&self, email: &str) -> impl Future<Output = Result<Customer, BigCommerceError>> + Send;
}

/// Customer addresses.
pub trait AddressClient: Send + Sync {
    fn create_address(
        &self,
        customer_id: CustomerId,
        address: &Address,
    ) -> impl Future<Output = Result<Address, BigCommerceError>> + Send;

    fn update_address(
        &self,
        customer_id: CustomerId,
        address: &Address,
    ) -> impl Future<Output = Result<Address, BigCommerceError>> + Send;

    fn delete_address(&self, address_id: AddressId) -> impl Future<Output = Result<(), BigCommerceError>> + Send;

    fn get_all_addresses(&self, customer_id: CustomerId) -> impl Future<Output = FetchAll<Address>> + Send;
}

/// Webhook subscriptions.
pub trait WebhookClient: Send + Sync {
    fn get_all_webhooks(&self) -> impl Future<Output = FetchAll<Webhook>> + Send;

    fn create_webhook(
        &self,
        scope: &str,
        destination: &str,
        headers: &BTreeMap<String, String>,
    ) -> impl Future<Output = Result<Webhook, BigCommerceError>> + Send;

    fn delete_webhook(&self, id: WebhookId) -> impl Future<Output = Result<(), BigCommerceError>> + Send;
}

impl StoreClient for Client {
    fn get_store_info(&self) -> impl Future<Output = Result<StoreInfo, BigCommerceError>> + Send {
        Self::get_store_info(self)
    }

    fn get_channels(&self, page: u32) -> impl Future<Output = Result<PageResult<Channel>, BigCommerceError>> + Send {
        Self::get_channels(self, page)
    }

    fn get_all_channels(&self) -> impl Future<Output = FetchAll<Channel>> + Send {
        Self::get_all_channels(self)
    }
}

impl CatalogClient for Client {
    fn get_products(&self, page: u32) -> impl Future<Output = Result<PageResult<Product>, BigCommerceError>> + Send {
        Self::get_products(self, page)
    }

    fn get_all_products(&self) -> impl Future<Output = FetchAll<Product>> + Send {
        Self::get_all_products(self)
    }

    fn get_product(&self, id: ProductId) -> impl Future<Output = Result<Product, BigCommerceError>> + Send {
        Self::get_product(self, id)
    }

    fn get_main_thumbnail_url(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<String>, BigCommerceError>> + Send {
        Self::get_main_thumbnail_url(self, id)
    }

    fn get_categories(&self, page: u32) -> impl Future<Output = Result<PageResult<Category>, BigCommerceError>> + Send {
        Self::get_categories(self, page)
    }

    fn get_all_categories(&self) -> impl Future<Output = FetchAll<Category>> + Send {
        Self::get_all_categories(self)
    }

    fn get_brands(&self, page: u32) -> impl Future<Output = Result<PageResult<Brand>, BigCommerceError>> + Send {
        Self::get_brands(self, page)
    }

    fn get_all_brands(&self) -> impl Future<Output = FetchAll<Brand>> + Send {
        Self::get_all_brands(self)
    }
}

impl BlogClient for Client {
    fn get_posts(&self, page: u32) -> impl Future<Output = Result<PageResult<Post>, BigCommerceError>> + Send {
        Self::get_posts(self, page)
    }

    fn get_all_posts(&self) -> impl Future<Output = FetchAll<Post>> + Send {
        Self::get_all_posts(self)
    }
}

impl CartClient for Client {
    fn create_cart(&self, items: &[LineItem]) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send {
        Self::create_cart(self, items)
    }

    fn get_cart(&self, cart_id: Uuid) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send {
        Self::get_cart(self, cart_id)
    }

    fn cart_add_items(
        &self,
        cart_id: Uuid,
        items: &[LineItem],
    ) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send {
        Self::cart_add_items(self, cart_id, items)
    }

    fn cart_edit_item(
        &self,
        cart_id: Uuid,
        item: &LineItem,
    ) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send {
        Self::cart_edit_item(self, cart_id, item)
    }

    fn cart_delete_item(
        &self,
        cart_id: Uuid,
        item: &LineItem,
    ) -> impl Future<Output = Result<Option<Cart>, BigCommerceError>> + Send {
        Self::cart_delete_item(self, cart_id, item)
    }

    fn cart_update_customer_id(
        &self,
        cart_id: Uuid,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Cart, BigCommerceError>> + Send {
        Self::cart_update_customer_id(self, cart_id, customer_id)
    }

    fn delete_cart(&self, cart_id: Uuid) -> impl Future<Output = Result<(), BigCommerceError>> + Send {
        Self::delete_cart(self, cart_id)
    }
}

impl CustomerClient for Client {
    fn validate_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<CustomerId, BigCommerceError>> + Send {
        Self::validate_credentials(self, email, password)
    }

    fn create_account(
        &self,
        payload: CreateAccountPayload,
    ) -> impl Future<Output = Result<Customer, BigCommerceError>> + Send {
        Self::create_account(self, payload)
    }

    fn set_form_fields(
        &self,
        customer_id: CustomerId,
        fields: &[FormField],
    ) -> impl Future<Output = Result<(), BigCommerceError>> + Send {
        Self::set_form_fields(self, customer_id, fields)
    }

    fn get_form_fields(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<FormField>, BigCommerceError>> + Send {
        Self::get_form_fields(self, customer_id)
    }

    fn get_customer_by_id(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Customer, BigCommerceError>> + Send {
        Self::get_customer_by_id(self, customer_id)
    }

    fn get_customer_by_email(&self, email: &str) -> impl Future<Output = Result<Customer, BigCommerceError>> + Send {
        Self::get_customer_by_email(self, email)
    }
}

impl AddressClient for Client {
    fn create_address(
        &self,
        customer_id: CustomerId,
        address: &Address,
    ) -> impl Future<Output = Result<Address, BigCommerceError>> + Send {
        Self::create_address(self, customer_id, address)
    }

    fn update_address(
        &self,
        customer_id: CustomerId,
        address: &Address,
    ) -> impl Future<Output = Result<Address, BigCommerceError>> + Send {
        Self::update_address(self, customer_id, address)
    }

    fn delete_address(&self, address_id: AddressId) -> impl Future<Output = Result<(), BigCommerceError>> + Send {
        Self::delete_address(self, address_id)
    }

    fn get_all_addresses(&self, customer_id: CustomerId) -> impl Future<Output = FetchAll<Address>> + Send {
        Self::get_all_addresses(self, customer_id)
    }
}

impl WebhookClient for Client {
    fn get_all_webhooks(&self) -> impl Future<Output = FetchAll<Webhook>> + Send {
        Self::get_all_webhooks(self)
    }

    fn create_webhook(
        &self,
        scope: &str,
        destination: &str,
        headers: &BTreeMap<String, String>,
    ) -> impl Future<Output = Result<Webhook, BigCommerceError>> + Send {
        Self::create_webhook(self, scope, destination, headers)
    }

    fn delete_webhook(&self, id: WebhookId) -> impl Future<Output = Result<(), BigCommerceError>> + Send {
        Self::delete_webhook(self, id)
    }
}
