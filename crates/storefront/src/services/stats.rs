//! Admin dashboard statistics.

use beerbro_core::models::AdminStats;

use crate::db::{
    DocumentStore, LocationRepository, OrderRepository, ProductRepository, RepositoryError,
    UserRepository,
};

/// Load every collection the dashboard needs and aggregate it.
///
/// # Errors
///
/// Returns `RepositoryError` if any collection fails to load.
pub async fn admin_stats(
    store: &dyn DocumentStore,
    low_stock_threshold: u32,
) -> Result<AdminStats, RepositoryError> {
    let products = ProductRepository::new(store).list_all().await?;
    let orders = OrderRepository::new(store).list(None).await?;
    let locations = LocationRepository::new(store).list().await?;
    let users = UserRepository::new(store).count().await?;

    Ok(AdminStats::compute(
        &products,
        &orders,
        usize::try_from(users).unwrap_or(usize::MAX),
        &locations,
        low_stock_threshold,
    ))
}
