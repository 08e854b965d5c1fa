//! Storefront-only models.
//!
//! Domain records live in `beerbro_core::models`; this module holds what
//! only the web layer needs.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
