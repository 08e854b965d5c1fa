//! Domain records and request bodies.

pub mod address;
pub mod cart;
pub mod category;
pub mod location;
pub mod order;
pub mod product;
pub mod stats;
pub mod user;

pub use address::{Address, AddressInput, AddressPatch, settle_default};
pub use cart::{Cart, CartLine, MAX_QUANTITY};
pub use category::{Category, CategoryInput};
pub use location::{LocationError, LocationInput, LocationPatch, ServiceLocation, resolve_location};
pub use order::{
    CheckoutRequest, NewOrder, Order, OrderItem, OrderStatusPatch, OrderTotals, PricingError,
};
pub use product::{Product, ProductInput, ProductPatch};
pub use stats::AdminStats;
pub use user::{CustomClaims, ProfilePatch, User};
