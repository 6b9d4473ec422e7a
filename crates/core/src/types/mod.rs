//! Core types for the BigCommerce toolkit.
//!
//! This module provides type-safe wrappers for BigCommerce domain concepts.

pub mod id;
pub mod pagination;
pub mod store_hash;

pub use id::*;
pub use pagination::{Envelope, Meta, PageLinks, Pagination, PaginationWithLinks};
pub use store_hash::{StoreHash, StoreHashError};
