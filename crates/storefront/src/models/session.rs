//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use beerbro_core::models::User;
use beerbro_core::{Email, Role, UserId};

/// Session-stored user identity.
///
/// Captured at login. The role is a snapshot of the `role` custom claim,
/// so a claim change applies from the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub uid: UserId,
    pub email: Email,
    pub display_name: Option<String>,
    pub role: Role,
}

impl CurrentUser {
    /// Whether the session carries the admin claim.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this user may act on `uid`'s records.
    #[must_use]
    pub fn can_access(&self, uid: &UserId) -> bool {
        &self.uid == uid || self.is_admin()
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart lines.
    pub const CART: &str = "cart";
}
