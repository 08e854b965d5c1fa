//! User repository.
//!
//! Profiles live in `users`; password hashes live in `credentials` under the
//! same id so a profile read can never leak a hash.

use beerbro_core::models::user::new_user_document;
use beerbro_core::models::{Address, CustomClaims, ProfilePatch, User};
use beerbro_core::{Email, Role, UserId};
use serde_json::json;

use super::store::{Collection, DocumentStore};
use super::{RepositoryError, decode, decode_all};

/// Repository for user profiles and their password credentials.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a user by uid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the document is malformed.
    pub async fn get(&self, uid: &UserId) -> Result<Option<User>, RepositoryError> {
        self.store
            .get(Collection::Users, uid.as_str())
            .await?
            .map(|doc| decode(Collection::Users, "uid", doc))
            .transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the document is malformed.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let docs = self
            .store
            .list_where(Collection::Users, "email", &json!(email.as_str()))
            .await?;
        docs.into_iter()
            .next()
            .map(|doc| decode(Collection::Users, "uid", doc))
            .transpose()
    }

    /// All users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a document is malformed.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let docs = self.store.list(Collection::Users).await?;
        decode_all(Collection::Users, "uid", docs)
    }

    /// Number of registered users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.count(Collection::Users).await?)
    }

    /// Create a user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create_with_password(
        &self,
        email: &Email,
        display_name: Option<&str>,
        role: Role,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        if self.get_by_email(email).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "user {email} already exists"
            )));
        }
        let uid = UserId::generate();
        self.store
            .set(
                Collection::Credentials,
                uid.as_str(),
                json!({ "passwordHash": password_hash }),
            )
            .await?;
        let doc = self
            .store
            .set(
                Collection::Users,
                uid.as_str(),
                new_user_document(email, display_name, role),
            )
            .await?;
        decode(Collection::Users, "uid", doc)
    }

    /// The stored password hash of a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the credential is malformed.
    pub async fn password_hash(&self, uid: &UserId) -> Result<Option<String>, RepositoryError> {
        let Some(doc) = self.store.get(Collection::Credentials, uid.as_str()).await? else {
            return Ok(None);
        };
        doc.data
            .get("passwordHash")
            .and_then(|v| v.as_str())
            .map(|hash| Some(hash.to_owned()))
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!("credentials/{uid}: missing passwordHash"))
            })
    }

    /// Apply a validated profile patch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_profile(
        &self,
        uid: &UserId,
        patch: &ProfilePatch,
    ) -> Result<User, RepositoryError> {
        self.merge(uid, patch.to_patch()).await
    }

    /// Replace the saved addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_addresses(
        &self,
        uid: &UserId,
        addresses: &[Address],
    ) -> Result<User, RepositoryError> {
        self.merge(uid, json!({ "addresses": addresses })).await
    }

    /// Set or clear the `admin` custom claim.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_role(&self, uid: &UserId, role: Role) -> Result<User, RepositoryError> {
        self.merge(uid, json!({ "customClaims": CustomClaims::for_role(role) }))
            .await
    }

    async fn merge(&self, uid: &UserId, patch: serde_json::Value) -> Result<User, RepositoryError> {
        let doc = self
            .store
            .merge(Collection::Users, uid.as_str(), patch)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        decode(Collection::Users, "uid", doc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let store = MemoryDocumentStore::new();
        let repo = UserRepository::new(&store);
        let user = repo
            .create_with_password(&email("ada@example.com"), Some("Ada"), Role::Customer, "hash")
            .await
            .unwrap();
        assert_eq!(user.role(), Role::Customer);
        assert_eq!(user.display_name.as_deref(), Some("Ada"));

        let found = repo.get_by_email(&email("ADA@example.com")).await.unwrap().unwrap();
        assert_eq!(found.uid, user.uid);
        assert_eq!(repo.password_hash(&user.uid).await.unwrap().as_deref(), Some("hash"));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryDocumentStore::new();
        let repo = UserRepository::new(&store);
        repo.create_with_password(&email("a@b.co"), None, Role::Customer, "h")
            .await
            .unwrap();
        let err = repo
            .create_with_password(&email("a@b.co"), None, Role::Customer, "h")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_set_role_round_trip() {
        let store = MemoryDocumentStore::new();
        let repo = UserRepository::new(&store);
        let user = repo
            .create_with_password(&email("a@b.co"), None, Role::Customer, "h")
            .await
            .unwrap();
        assert!(repo.set_role(&user.uid, Role::Admin).await.unwrap().is_admin());
        assert!(!repo.set_role(&user.uid, Role::Customer).await.unwrap().is_admin());
        assert!(matches!(
            repo.set_role(&UserId::new("ghost"), Role::Admin).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_user_documents_never_contain_hash() {
        let store = MemoryDocumentStore::new();
        let repo = UserRepository::new(&store);
        let user = repo
            .create_with_password(&email("a@b.co"), None, Role::Customer, "secret-hash")
            .await
            .unwrap();
        let doc = store.get(Collection::Users, user.uid.as_str()).await.unwrap().unwrap();
        assert!(!doc.data.to_string().contains("secret-hash"));
    }
}
