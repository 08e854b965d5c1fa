//! Saved delivery addresses on a user profile.

use beerbro_core::models::{Address, AddressInput, AddressPatch, settle_default};
use beerbro_core::{AddressId, UserId, ValidationError};
use thiserror::Error;

use crate::db::{DocumentStore, RepositoryError, UserRepository};

/// Address book errors.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("user not found")]
    UserNotFound,

    #[error("address not found")]
    AddressNotFound,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Reads and rewrites the `addresses` array of a user document.
pub struct AddressBook<'a> {
    users: UserRepository<'a>,
}

impl<'a> AddressBook<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    /// Saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::UserNotFound` for an unknown uid.
    pub async fn list(&self, uid: &UserId) -> Result<Vec<Address>, AddressError> {
        let mut addresses = self.load(uid).await?;
        addresses.sort_by_key(|a| !a.is_default);
        Ok(addresses)
    }

    /// Validate and append an address. The first saved address becomes the
    /// default; an address marked `isDefault` takes the default over.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Invalid` for a bad field.
    pub async fn add(&self, uid: &UserId, input: AddressInput) -> Result<Address, AddressError> {
        input.validate()?;
        let mut addresses = self.load(uid).await?;
        let address = input.into_address();
        let default_id = address.is_default.then(|| address.id.clone());
        addresses.push(address);
        settle_default(&mut addresses, default_id.as_ref());

        let added = addresses.last().cloned().ok_or(AddressError::AddressNotFound)?;
        self.users.set_addresses(uid, &addresses).await?;
        Ok(added)
    }

    /// Apply a patch to one address. Setting `isDefault` clears the flag on
    /// every other address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::AddressNotFound` for an unknown address id.
    pub async fn update(
        &self,
        uid: &UserId,
        address_id: &AddressId,
        patch: AddressPatch,
    ) -> Result<Address, AddressError> {
        let mut addresses = self.load(uid).await?;
        let slot = addresses
            .iter_mut()
            .find(|a| &a.id == address_id)
            .ok_or(AddressError::AddressNotFound)?;
        let make_default = patch.is_default == Some(true);
        *slot = patch.apply(slot)?;

        settle_default(&mut addresses, make_default.then_some(address_id));
        let updated = addresses
            .iter()
            .find(|a| &a.id == address_id)
            .cloned()
            .ok_or(AddressError::AddressNotFound)?;
        self.users.set_addresses(uid, &addresses).await?;
        Ok(updated)
    }

    /// Remove an address. If it was the default, the first remaining
    /// address becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::AddressNotFound` for an unknown address id.
    pub async fn remove(&self, uid: &UserId, address_id: &AddressId) -> Result<(), AddressError> {
        let mut addresses = self.load(uid).await?;
        let before = addresses.len();
        addresses.retain(|a| &a.id != address_id);
        if addresses.len() == before {
            return Err(AddressError::AddressNotFound);
        }
        settle_default(&mut addresses, None);
        self.users.set_addresses(uid, &addresses).await?;
        Ok(())
    }

    async fn load(&self, uid: &UserId) -> Result<Vec<Address>, AddressError> {
        self.users
            .get(uid)
            .await?
            .map(|user| user.addresses)
            .ok_or(AddressError::UserNotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use beerbro_core::Email;
    use beerbro_core::Role;
    use serde_json::json;

    use super::*;
    use crate::db::MemoryDocumentStore;

    fn input(postal: &str, is_default: bool) -> AddressInput {
        serde_json::from_value(json!({
            "fullName": "Ada Brewer",
            "phone": "5550102030",
            "line1": "1 Hop Lane",
            "city": "Portland",
            "state": "OR",
            "postalCode": postal,
            "isDefault": is_default
        }))
        .unwrap()
    }

    async fn user(store: &MemoryDocumentStore) -> UserId {
        let email = Email::parse("ada@example.com").unwrap();
        UserRepository::new(store)
            .create_with_password(&email, Some("Ada"), Role::Customer, "hash")
            .await
            .unwrap()
            .uid
    }

    #[tokio::test]
    async fn test_first_address_becomes_default() {
        let store = MemoryDocumentStore::new();
        let uid = user(&store).await;
        let book = AddressBook::new(&store);

        let first = book.add(&uid, input("97201", false)).await.unwrap();
        assert!(first.is_default);
        let second = book.add(&uid, input("97202", false)).await.unwrap();
        assert!(!second.is_default);

        let third = book.add(&uid, input("97203", true)).await.unwrap();
        assert!(third.is_default);
        let all = book.list(&uid).await.unwrap();
        assert_eq!(all.iter().filter(|a| a.is_default).count(), 1);
        assert_eq!(all[0].id, third.id);
    }

    #[tokio::test]
    async fn test_update_default_clears_others() {
        let store = MemoryDocumentStore::new();
        let uid = user(&store).await;
        let book = AddressBook::new(&store);
        let first = book.add(&uid, input("97201", false)).await.unwrap();
        let second = book.add(&uid, input("97202", false)).await.unwrap();

        let patch = AddressPatch {
            is_default: Some(true),
            ..AddressPatch::default()
        };
        book.update(&uid, &second.id, patch).await.unwrap();

        let all = book.list(&uid).await.unwrap();
        assert_eq!(all[0].id, second.id);
        assert!(!all.iter().find(|a| a.id == first.id).unwrap().is_default);
    }

    #[tokio::test]
    async fn test_remove_default_promotes_next() {
        let store = MemoryDocumentStore::new();
        let uid = user(&store).await;
        let book = AddressBook::new(&store);
        let first = book.add(&uid, input("97201", false)).await.unwrap();
        let second = book.add(&uid, input("97202", false)).await.unwrap();

        book.remove(&uid, &first.id).await.unwrap();
        let all = book.list(&uid).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, second.id);
        assert!(all[0].is_default);

        assert!(matches!(
            book.remove(&uid, &first.id).await,
            Err(AddressError::AddressNotFound)
        ));
    }
}
