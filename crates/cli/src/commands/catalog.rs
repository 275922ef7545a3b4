//! Catalog listing.
//!
//! # Usage
//!
//! ```bash
//! shopfront catalog --search oud --sort high --page 2
//! ```

use shopfront_core::Price;
use shopfront_storefront::ShopSession;
use shopfront_storefront::backend::BackendClient;
use shopfront_storefront::catalog::CatalogQuery;
use shopfront_storefront::config::StorefrontConfig;
use tracing::info;

/// Load the catalog and print one page of results.
///
/// # Errors
///
/// Returns an error if the backend client cannot be built or the product
/// list cannot be fetched.
pub async fn list(
    config: &StorefrontConfig,
    query: &CatalogQuery,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::new(&config.backend)?;
    let (mut session, _notices) = ShopSession::new(client, config.checkout.clone());
    session.load_catalog().await.inspect_err(|e| e.report())?;

    let page = session.catalog().query(query);
    if page.items.is_empty() {
        info!(page = page.page, total_pages = page.total_pages, "No products on this page");
        return Ok(());
    }

    info!(
        "Page {} of {} ({} products)",
        page.page, page.total_pages, page.total_items
    );
    for product in &page.items {
        let mut options = Vec::new();
        if !product.colors.is_empty() {
            options.push(format!("colors: {}", product.colors.join("/")));
        }
        if !product.sizes.is_empty() {
            options.push(format!("sizes: {}", product.sizes.join("/")));
        }
        if !product.volumes.is_empty() {
            options.push(format!("volumes: {}", product.volumes.join("/")));
        }

        info!(
            "{:<26} {:<32} {:<14} {:>10}  {}",
            product.id.as_str(),
            product.name,
            product.category,
            Price::new(product.price, config.checkout.currency).to_string(),
            options.join("; ")
        );
    }

    Ok(())
}
