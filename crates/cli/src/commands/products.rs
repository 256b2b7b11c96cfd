//! Product maintenance commands.

use trailforge_server::db::ProductRepository;
use trailforge_server::services::CatalogService;

use super::{CliError, connect, object_store};

/// Rewrite product display order to `0..n-1`, keeping the current sequence.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the reorder fails.
pub async fn renumber() -> Result<(), CliError> {
    let pool = connect().await?;
    let images = object_store().await?;
    let products = ProductRepository::new(pool);

    let changed = CatalogService::new(&products, &images)
        .normalize_order()
        .await?;

    tracing::info!(changed, "Product order renumbered");
    Ok(())
}
