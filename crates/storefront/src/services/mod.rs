//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `addresses` - Saved delivery addresses on a profile
//! - `auth` - Email/password accounts (Argon2id)
//! - `cart` - Session cart, resolved against the catalog
//! - `checkout` - Order placement and stock decrement
//! - `stats` - Admin dashboard aggregates

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod stats;

pub use addresses::{AddressBook, AddressError};
pub use auth::{AuthError, AuthService};
pub use cart::CartError;
pub use checkout::{CheckoutError, CheckoutService};
