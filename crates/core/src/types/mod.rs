//! Core types for BeerBro.
//!
//! Type-safe wrappers for document keys, emails, prices and statuses.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
