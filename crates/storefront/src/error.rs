//! Unified error handling with Sentry integration.
//!
//! Provides the umbrella `StorefrontError` returned by session operations,
//! plus helpers that keep Sentry's user context and breadcrumb trail in step
//! with what the shopper is doing.

use thiserror::Error;

use crate::backend::BackendError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Order placement or verification failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Operation requires a logged-in session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl StorefrontError {
    /// Whether the error is worth reporting to Sentry.
    ///
    /// Validation failures and logged-out shoppers are expected; transport
    /// and protocol failures are not.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Backend(err) => !matches!(err, BackendError::Rejected(_) | BackendError::Unauthorized),
            Self::Checkout(err) => err.is_reportable(),
            Self::Config(_) | Self::Unauthorized(_) => false,
        }
    }

    /// Log the error and capture it to Sentry when reportable.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront error");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.filter(|e| !e.is_empty()).map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// edits leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("key", "p1-red--")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::Unauthorized("login required".to_string());
        assert_eq!(err.to_string(), "Unauthorized: login required");

        let err = StorefrontError::from(BackendError::Rejected("Out of stock".to_string()));
        assert_eq!(
            err.to_string(),
            "Backend error: Request rejected: Out of stock"
        );
    }

    #[test]
    fn test_reportable_errors() {
        assert!(
            StorefrontError::from(BackendError::Api {
                status: 500,
                message: "boom".to_string()
            })
            .is_reportable()
        );
        assert!(!StorefrontError::from(BackendError::Unauthorized).is_reportable());
        assert!(
            !StorefrontError::from(BackendError::Rejected("nope".to_string())).is_reportable()
        );
        assert!(!StorefrontError::from(CheckoutError::EmptyCart).is_reportable());
        assert!(!StorefrontError::Unauthorized("x".to_string()).is_reportable());
    }

    #[test]
    fn test_sentry_helpers_without_client_are_noops() {
        set_sentry_user(&"u1", Some("ada@example.com"));
        add_breadcrumb("cart", "Added to cart", Some(&[("key", "p1---")]));
        clear_sentry_user();
    }
}
