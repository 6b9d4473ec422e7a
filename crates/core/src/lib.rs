//! BigCommerce Core - Shared types library.
//!
//! This crate provides the types shared by every BigCommerce toolkit component:
//! - `client` - Typed REST client, pagination and signed-payload verification
//! - `app` - Single-click app server (install, load, uninstall callbacks)
//! - `cli` - Command-line tools for inspecting a store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, store hashes and the paginated response envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
