//! Seed the catalog with products from a YAML file.
//!
//! The whole file is validated before anything is written, so a bad entry
//! never leaves the catalog half seeded.
//!
//! ```yaml
//! products:
//!   - name: Alpine Snow Boot
//!     description: Insulated winter boot
//!     price: "129.00"
//!     imageUrl: /uploads/alpine.jpg
//!     categories: [men-boots]
//!     subCategories: [men-snow-boots]
//!     featured: true
//! ```

use std::path::Path;

use serde::Deserialize;

use trailforge_server::db::ProductRepository;
use trailforge_server::services::{CatalogService, ProductInput};

use super::{CliError, connect, object_store};

/// Top level of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<ProductInput>,
}

/// Parse a seed file's contents.
///
/// # Errors
///
/// Returns `CliError::Yaml` if the contents do not match [`SeedFile`].
pub fn parse(content: &str) -> Result<SeedFile, CliError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Problems found in a seed file, as `(index, name, message)`.
pub fn problems(seed: &SeedFile) -> Vec<(usize, String, String)> {
    seed.products
        .iter()
        .enumerate()
        .filter_map(|(index, product)| {
            product.validate_new().err().map(|e| {
                (
                    index,
                    product.name.clone().unwrap_or_else(|| "<unnamed>".to_string()),
                    e.to_string(),
                )
            })
        })
        .collect()
}

/// Create every product in `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, or the database rejects a write.
pub async fn products(path: &Path, dry_run: bool) -> Result<(), CliError> {
    tracing::info!(path = %path.display(), "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let seed = parse(&content)?;
    tracing::info!(products = seed.products.len(), "Parsed seed file");

    let problems = problems(&seed);
    if !problems.is_empty() {
        tracing::error!("Seed file validation failed:");
        for (index, name, message) in &problems {
            tracing::error!("  - #{index} {name}: {message}");
        }
        return Err(CliError::Invalid {
            count: problems.len(),
        });
    }

    if dry_run {
        tracing::info!("Seed file is valid (dry run, nothing written)");
        return Ok(());
    }

    let pool = connect().await?;
    let images = object_store().await?;
    let repository = ProductRepository::new(pool);
    let catalog = CatalogService::new(&repository, &images);

    let total = seed.products.len();
    for input in seed.products {
        let product = catalog.create(input).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "Created product");
    }

    tracing::info!(created = total, "Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_seed_file_is_valid() {
        let seed = parse(include_str!("../../seed/products.yaml")).unwrap();
        assert!(!seed.products.is_empty());
        assert!(problems(&seed).is_empty());
    }

    #[test]
    fn test_problems_name_the_entry() {
        let seed = parse(
            r#"
products:
  - name: Ridge Runner
    description: Lightweight hiker
    price: "99.00"
    imageUrl: /uploads/ridge.jpg
    categories: [sandals]
  - name: Missing Price
    description: No price given
    imageUrl: /uploads/none.jpg
"#,
        )
        .unwrap();

        let problems = problems(&seed);
        assert_eq!(problems.len(), 2);
        assert_eq!(
            problems[0],
            (
                0,
                "Ridge Runner".to_string(),
                "Invalid category: sandals".to_string()
            )
        );
        assert_eq!(problems[1].2, "Missing required fields");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let seed = parse("products: []\nversion: 2\n").unwrap();
        assert!(seed.products.is_empty());
    }
}
