//! Order history.
//!
//! # Usage
//!
//! ```bash
//! SHOPFRONT_PASSWORD=... shopfront orders -e ada@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_PASSWORD` - Account password, if not passed with `--password`

use secrecy::SecretString;
use shopfront_core::Price;
use shopfront_storefront::ShopSession;
use shopfront_storefront::backend::BackendClient;
use shopfront_storefront::cart::NoticeLevel;
use shopfront_storefront::config::StorefrontConfig;
use tracing::{info, warn};

/// Log in and print the account's orders, newest first.
///
/// # Errors
///
/// Returns an error if login fails or the orders cannot be fetched.
pub async fn list(
    config: &StorefrontConfig,
    email: &str,
    password: SecretString,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::new(&config.backend)?;
    let (mut session, mut notices) = ShopSession::new(client, config.checkout.clone());

    let user = session
        .login(email, &password)
        .await
        .inspect_err(|e| e.report())?;
    info!(user = %user.name, "Logged in");

    let orders = session.orders().await.inspect_err(|e| e.report())?;

    while let Ok(notice) = notices.try_recv() {
        match notice.level {
            NoticeLevel::Error => warn!("{}", notice.message),
            NoticeLevel::Info | NoticeLevel::Success => info!("{}", notice.message),
        }
    }

    if orders.is_empty() {
        info!("No orders yet");
        return Ok(());
    }

    let currency = config.checkout.currency;
    for order in &orders {
        let date = order
            .date
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
        let payment = if order.payment { "paid" } else { "pending" };

        info!(
            "{} {} {:<18} {:>10} {} ({payment})",
            order.id,
            date,
            order.status.to_string(),
            Price::new(order.amount, currency).to_string(),
            order.payment_method,
        );
        for item in &order.items {
            let attributes: Vec<&str> = [item.color.as_str(), item.size.as_str(), item.volume.as_str()]
                .into_iter()
                .filter(|a| !a.is_empty())
                .collect();
            info!(
                "    {} x {} {}",
                item.quantity,
                item.name,
                attributes.join(" / ")
            );
        }
    }

    Ok(())
}
