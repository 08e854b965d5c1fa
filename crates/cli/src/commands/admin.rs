//! Admin claim management.
//!
//! # Usage
//!
//! ```bash
//! bb-cli admin grant ada@example.com
//! bb-cli admin revoke ada@example.com
//! bb-cli admin show ada@example.com
//! bb-cli admin create -e ops@example.com -p 'a long passphrase' -n "Ops"
//! ```
//!
//! The claim is copied into the session at login, so a signed-in user only
//! sees a grant or revoke after signing out and back in.

use beerbro_core::models::User;
use beerbro_core::{Email, EmailError, Role};
use beerbro_storefront::db::{PgDocumentStore, RepositoryError, UserRepository};
use beerbro_storefront::services::{AuthError, AuthService};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No account uses this email.
    #[error("No user with email: {0}")]
    UserNotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Could not create account: {0}")]
    Auth(#[from] AuthError),
}

/// Give an existing user the admin claim.
///
/// # Errors
///
/// Returns an error if the email is invalid, unknown, or the update fails.
pub async fn grant(email: &str) -> Result<(), AdminError> {
    let user = set_role(email, Role::Admin).await?;
    tracing::info!(uid = %user.uid, email = %user.email, "Admin claim granted");
    print_relogin_notice(&user);
    Ok(())
}

/// Take the admin claim away.
///
/// # Errors
///
/// Returns an error if the email is invalid, unknown, or the update fails.
pub async fn revoke(email: &str) -> Result<(), AdminError> {
    let user = set_role(email, Role::Customer).await?;
    tracing::info!(uid = %user.uid, email = %user.email, "Admin claim revoked");
    print_relogin_notice(&user);
    Ok(())
}

/// Print a user's claims.
///
/// # Errors
///
/// Returns an error if the email is invalid or unknown.
pub async fn show(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let store = PgDocumentStore::new(connect().await?);
    let user = find(&UserRepository::new(&store), &email).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("uid:    {}", user.uid);
        println!("email:  {}", user.email);
        println!("role:   {}", user.role());
        println!("claims: {}", claims_json(&user));
    }
    Ok(())
}

/// Create an account that already holds the admin claim.
///
/// # Errors
///
/// Returns an error if the email is taken, the password is too weak, or the
/// database is unreachable.
pub async fn create(email: &str, password: &str, name: Option<&str>) -> Result<(), AdminError> {
    let store = PgDocumentStore::new(connect().await?);
    let user = AuthService::new(&store)
        .create_account(email, password, name, Role::Admin)
        .await?;

    tracing::info!(uid = %user.uid, email = %user.email, "Admin account created");
    Ok(())
}

async fn set_role(email: &str, role: Role) -> Result<User, AdminError> {
    let email = Email::parse(email)?;
    let store = PgDocumentStore::new(connect().await?);
    let users = UserRepository::new(&store);
    let user = find(&users, &email).await?;
    Ok(users.set_role(&user.uid, role).await?)
}

async fn find(users: &UserRepository<'_>, email: &Email) -> Result<User, AdminError> {
    users
        .get_by_email(email)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.to_string()))
}

fn claims_json(user: &User) -> String {
    serde_json::to_string(&user.custom_claims).unwrap_or_else(|_| "{}".to_owned())
}

#[allow(clippy::print_stdout)]
fn print_relogin_notice(user: &User) {
    println!(
        "{} is now {}. Ask them to sign out and back in for the change to take effect.",
        user.email,
        user.role()
    );
}
