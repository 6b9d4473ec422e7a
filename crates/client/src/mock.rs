//! In-memory test doubles for the [`crate::capabilities`] traits.
//!
//! Each double keeps its state behind a `Mutex` so it can be shared across
//! tasks like a real [`crate::Client`]. Collection pages are cut from the
//! stored vectors with the configured page size and report `total_pages`,
//! so they also work with [`Paginator::fetch_all_buffered`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bigcommerce_core::{ChannelId, CustomerId, ProductId};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::capabilities::{BlogClient, CartClient, CatalogClient, CustomerClient, FetchAll};
use crate::error::BigCommerceError;
use crate::pagination::{PageResult, Paginator};
use crate::resources::{
    Brand, Cart, CartLineItems, Category, CreateAccountPayload, Customer, FormField, LineItem, Post,
    Product,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cut page `page` (1-based) out of `items`.
fn page_of<T: Clone>(items: &[T], page: u32, page_size: usize) -> PageResult<T> {
    let page_size = page_size.max(1);
    let total_pages = u32::try_from(items.len().div_ceil(page_size).max(1)).unwrap_or(u32::MAX);
    let skip = usize::try_from(page.saturating_sub(1))
        .unwrap_or(usize::MAX)
        .saturating_mul(page_size);
    let chunk = items.iter().skip(skip).take(page_size).cloned().collect();
    PageResult::new(chunk, page < total_pages).with_total_pages(total_pages)
}

fn unavailable() -> BigCommerceError {
    BigCommerceError::Api {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "injected failure".to_string(),
    }
}

/// Catalog and blog backed by vectors.
#[derive(Debug, Default)]
pub struct MockCatalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub posts: Vec<Post>,
    pub thumbnails: HashMap<ProductId, String>,
    page_size: usize,
    paginator: Paginator,
    /// Product page → remaining injected failures.
    failures: Mutex<HashMap<u32, u32>>,
}

impl MockCatalog {
    /// An empty catalog serving `page_size` items per page.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Use `paginator` for the `get_all_*` operations.
    #[must_use]
    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator;
        self
    }

    /// Make the next `times` requests for product page `page` fail with a 503.
    pub fn fail_product_page(&self, page: u32, times: u32) {
        lock(&self.failures).insert(page, times);
    }

    fn take_failure(&self, page: u32) -> bool {
        let mut failures = lock(&self.failures);
        match failures.get_mut(&page) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl CatalogClient for MockCatalog {
    async fn get_products(&self, page: u32) -> Result<PageResult<Product>, BigCommerceError> {
        if self.take_failure(page) {
            return Err(unavailable());
        }
        Ok(page_of(&self.products, page, self.page_size))
    }

    async fn get_all_products(&self) -> FetchAll<Product> {
        self.paginator
            .fetch_all(|page| self.get_products(page))
            .await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, BigCommerceError> {
        self.products
            .iter()
            .find(|product| product.id == id)
            .cloned()
            .ok_or(BigCommerceError::NotFound)
    }

    async fn get_main_thumbnail_url(&self, id: ProductId) -> Result<Option<String>, BigCommerceError> {
        Ok(self.thumbnails.get(&id).cloned())
    }

    async fn get_categories(&self, page: u32) -> Result<PageResult<Category>, BigCommerceError> {
        Ok(page_of(&self.categories, page, self.page_size))
    }

    async fn get_all_categories(&self) -> FetchAll<Category> {
        self.paginator
            .fetch_all(|page| self.get_categories(page))
            .await
    }

    async fn get_brands(&self, page: u32) -> Result<PageResult<Brand>, BigCommerceError> {
        Ok(page_of(&self.brands, page, self.page_size))
    }

    async fn get_all_brands(&self) -> FetchAll<Brand> {
        self.paginator.fetch_all(|page| self.get_brands(page)).await
    }
}

impl BlogClient for MockCatalog {
    async fn get_posts(&self, page: u32) -> Result<PageResult<Post>, BigCommerceError> {
        Ok(page_of(&self.posts, page, self.page_size))
    }

    async fn get_all_posts(&self) -> FetchAll<Post> {
        self.paginator.fetch_all(|page| self.get_posts(page)).await
    }
}

/// A single known customer with a password.
#[derive(Debug)]
pub struct MockCustomers {
    customer: Mutex<Customer>,
    password: SecretString,
    form_fields: Mutex<Vec<FormField>>,
    next_id: AtomicI64,
}

impl MockCustomers {
    /// A store whose only customer is `customer`, logging in with `password`.
    #[must_use]
    pub fn new(customer: Customer, password: SecretString) -> Self {
        let next_id = customer.id.as_i64() + 1;
        Self {
            customer: Mutex::new(customer),
            password,
            form_fields: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(next_id),
        }
    }

    /// Form fields stored so far.
    #[must_use]
    pub fn form_fields(&self) -> Vec<FormField> {
        lock(&self.form_fields).clone()
    }
}

impl CustomerClient for MockCustomers {
    async fn validate_credentials(&self, email: &str, password: &SecretString) -> Result<CustomerId, BigCommerceError> {
        let customer = lock(&self.customer);
        if customer.email == email && self.password.expose_secret() == password.expose_secret() {
            Ok(customer.id)
        } else {
            Err(BigCommerceError::NotFound)
        }
    }

    async fn create_account(&self, payload: CreateAccountPayload) -> Result<Customer, BigCommerceError> {
        if lock(&self.customer).email == payload.email {
            return Err(BigCommerceError::Unprocessable(format!(
                "The email address {} is already in use",
                payload.email
            )));
        }
        Ok(Customer {
            id: CustomerId::new(self.next_id.fetch_add(1, Ordering::Relaxed)),
            company: payload.company,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone: payload.phone,
            customer_group_id: payload.customer_group_id,
            addresses: payload.addresses,
            ..Customer::default()
        })
    }

    async fn set_form_fields(&self, customer_id: CustomerId, fields: &[FormField]) -> Result<(), BigCommerceError> {
        if customer_id.is_unset() {
            return Err(BigCommerceError::MissingField("customer_id"));
        }
        let mut stored = lock(&self.form_fields);
        for field in fields {
            stored.retain(|f| !(f.customer_id == customer_id && f.name == field.name));
            stored.push(FormField {
                customer_id,
                ..field.clone()
            });
        }
        Ok(())
    }

    async fn get_form_fields(&self, customer_id: CustomerId) -> Result<Vec<FormField>, BigCommerceError> {
        Ok(lock(&self.form_fields)
            .iter()
            .filter(|f| f.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn get_customer_by_id(&self, customer_id: CustomerId) -> Result<Customer, BigCommerceError> {
        let customer = lock(&self.customer);
        if customer.id == customer_id {
            Ok(customer.clone())
        } else {
            Err(BigCommerceError::NotFound)
        }
    }

    async fn get_customer_by_email(&self, email: &str) -> Result<Customer, BigCommerceError> {
        let customer = lock(&self.customer);
        if customer.email == email {
            Ok(customer.clone())
        } else {
            Err(BigCommerceError::NotFound)
        }
    }
}

/// Carts kept in a map. Line items are treated as physical.
#[derive(Debug, Default)]
pub struct MockCarts {
    carts: Mutex<HashMap<Uuid, Cart>>,
    channel_id: ChannelId,
}

impl MockCarts {
    /// An empty cart store for `channel_id`.
    #[must_use]
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            carts: Mutex::new(HashMap::new()),
            channel_id,
        }
    }

    /// Number of live carts.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.carts).len()
    }

    /// Whether no cart exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.carts).is_empty()
    }

    fn with_cart<R>(&self, cart_id: Uuid, f: impl FnOnce(&mut Cart) -> R) -> Result<R, BigCommerceError> {
        let mut carts = lock(&self.carts);
        let cart = carts.get_mut(&cart_id).ok_or(BigCommerceError::NotFound)?;
        Ok(f(cart))
    }
}

fn with_ids(items: &[LineItem]) -> Vec<LineItem> {
    items
        .iter()
        .map(|item| LineItem {
            id: Some(item.id.unwrap_or_else(Uuid::new_v4)),
            ..item.clone()
        })
        .collect()
}

fn recompute(cart: &mut Cart) {
    cart.base_amount = cart
        .line_items
        .iter()
        .map(|item| item.list_price * item.quantity)
        .sum();
    cart.cart_amount = cart.base_amount - cart.discount_amount;
}

impl CartClient for MockCarts {
    async fn create_cart(&self, items: &[LineItem]) -> Result<Cart, BigCommerceError> {
        let mut cart = Cart {
            id: Uuid::new_v4(),
            channel_id: self.channel_id,
            line_items: CartLineItems {
                physical_items: with_ids(items),
                ..CartLineItems::default()
            },
            ..Cart::default()
        };
        recompute(&mut cart);
        lock(&self.carts).insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn get_cart(&self, cart_id: Uuid) -> Result<Cart, BigCommerceError> {
        self.with_cart(cart_id, |cart| cart.clone())
    }

    async fn cart_add_items(&self, cart_id: Uuid, items: &[LineItem]) -> Result<Cart, BigCommerceError> {
        self.with_cart(cart_id, |cart| {
            cart.line_items.physical_items.extend(with_ids(items));
            recompute(cart);
            cart.clone()
        })
    }

    async fn cart_edit_item(&self, cart_id: Uuid, item: &LineItem) -> Result<Cart, BigCommerceError> {
        let item_id = item.id.ok_or(BigCommerceError::MissingField("line_item.id"))?;
        self.with_cart(cart_id, |cart| {
            let existing = cart
                .line_items
                .physical_items
                .iter_mut()
                .find(|existing| existing.id == Some(item_id))
                .ok_or(BigCommerceError::NotFound)?;
            existing.quantity = item.quantity;
            recompute(cart);
            Ok(cart.clone())
        })?
    }

    async fn cart_delete_item(&self, cart_id: Uuid, item: &LineItem) -> Result<Option<Cart>, BigCommerceError> {
        let item_id = item.id.ok_or(BigCommerceError::MissingField("line_item.id"))?;
        let mut carts = lock(&self.carts);
        let cart = carts.get_mut(&cart_id).ok_or(BigCommerceError::NotFound)?;
        cart.line_items
            .physical_items
            .retain(|existing| existing.id != Some(item_id));
        if cart.line_items.iter().next().is_none() {
            carts.remove(&cart_id);
            return Ok(None);
        }
        recompute(cart);
        Ok(Some(cart.clone()))
    }

    async fn cart_update_customer_id(&self, cart_id: Uuid, customer_id: CustomerId) -> Result<Cart, BigCommerceError> {
        self.with_cart(cart_id, |cart| {
            cart.customer_id = customer_id;
            cart.clone()
        })
    }

    async fn delete_cart(&self, cart_id: Uuid) -> Result<(), BigCommerceError> {
        lock(&self.carts)
            .remove(&cart_id)
            .map(|_| ())
            .ok_or(BigCommerceError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::pagination::{FetchFailure, RetryMode, RetryPolicy};

    fn products(n: i64) -> Vec<Product> {
        (1..=n)
            .map(|i| Product {
                id: ProductId::new(i),
                name: format!("Product {i}"),
                ..Product::default()
            })
            .collect()
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            mode: RetryMode::RetrySamePage,
            backoff: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_catalog_pages_through_everything() {
        let catalog = MockCatalog {
            products: products(7),
            ..MockCatalog::new(3)
        };
        let page = catalog.get_products(3).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(!page.has_more);
        assert_eq!(page.total_pages, Some(3));

        let all = catalog.get_all_products().await.unwrap();
        let ids: Vec<_> = all.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_catalog_injected_failure_is_retried() {
        let catalog = MockCatalog {
            products: products(4),
            ..MockCatalog::new(2)
        }
        .with_paginator(Paginator::new(fast_policy(1)));
        catalog.fail_product_page(2, 1);

        assert_eq!(catalog.get_all_products().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_catalog_exhausted_budget_keeps_earlier_pages() {
        let catalog = MockCatalog {
            products: products(4),
            ..MockCatalog::new(2)
        }
        .with_paginator(Paginator::new(fast_policy(1)));
        catalog.fail_product_page(2, 5);

        let err = catalog.get_all_products().await.unwrap_err();
        assert_eq!(err.items.len(), 2);
        assert_eq!(err.page, 2);
        assert!(matches!(err.kind, FetchFailure::MaxRetriesExceeded { .. }));
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let catalog = MockCatalog::new(250);
        assert!(catalog.get_all_brands().await.unwrap().is_empty());
        assert!(matches!(
            catalog.get_product(ProductId::new(1)).await,
            Err(BigCommerceError::NotFound)
        ));
    }

    async fn login<C: CustomerClient>(customers: &C, email: &str, password: &str) -> Option<Customer> {
        let id = customers
            .validate_credentials(email, &SecretString::from(password))
            .await
            .ok()?;
        customers.get_customer_by_id(id).await.ok()
    }

    #[tokio::test]
    async fn test_customers_login() {
        let customers = MockCustomers::new(
            Customer {
                id: CustomerId::new(11),
                email: "jane@example.com".into(),
                ..Customer::default()
            },
            SecretString::from("Correct-Horse-9"),
        );
        assert!(login(&customers, "jane@example.com", "Correct-Horse-9").await.is_some());
        assert!(login(&customers, "jane@example.com", "wrong").await.is_none());
        assert!(login(&customers, "joe@example.com", "Correct-Horse-9").await.is_none());
    }

    #[tokio::test]
    async fn test_customers_form_fields() {
        let customers = MockCustomers::new(Customer::default(), SecretString::from("x"));
        let id = CustomerId::new(3);
        let field = |value: &str| FormField {
            name: "Newsletter".into(),
            value: value.into(),
            ..FormField::default()
        };
        customers.set_form_fields(id, &[field("no")]).await.unwrap();
        customers.set_form_fields(id, &[field("yes")]).await.unwrap();

        let stored = customers.get_form_fields(id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value, "yes");
        assert!(matches!(
            customers.set_form_fields(CustomerId::default(), &[field("x")]).await,
            Err(BigCommerceError::MissingField("customer_id"))
        ));
    }

    #[tokio::test]
    async fn test_carts_lifecycle() {
        let carts = MockCarts::new(ChannelId::new(1));
        let mut item = LineItem::new(ProductId::new(77), 2.0);
        item.list_price = 10.0;

        let cart = carts.create_cart(&[item]).await.unwrap();
        assert!((cart.cart_amount - 20.0).abs() < f64::EPSILON);

        let mut line = cart.line_items.physical_items[0].clone();
        line.quantity = 3.0;
        let cart = carts.cart_edit_item(cart.id, &line).await.unwrap();
        assert!((cart.base_amount - 30.0).abs() < f64::EPSILON);

        let cart = carts
            .cart_update_customer_id(cart.id, CustomerId::new(11))
            .await
            .unwrap();
        assert_eq!(cart.customer_id, CustomerId::new(11));

        assert!(carts.cart_delete_item(cart.id, &line).await.unwrap().is_none());
        assert!(carts.is_empty());
        assert!(matches!(
            carts.delete_cart(cart.id).await,
            Err(BigCommerceError::NotFound)
        ));
    }
}
