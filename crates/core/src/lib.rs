//! BeerBro Core - Shared types library.
//!
//! This crate provides the types and pure logic used across all BeerBro
//! components:
//! - `storefront` - Public shop, admin console and JSON API
//! - `cli` - Command-line tools for migrations, seeding and admin claims
//!
//! # Architecture
//!
//! The core crate contains only types and logic - no I/O, no database
//! access, no HTTP. Everything that touches the document store lives in the
//! storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`models`] - Domain records, request bodies and their validation
//! - [`search`] - Product search and listing filters
//! - [`validation`] - Field rules shared by request bodies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod search;
pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{ValidationError, ValidationResult};
