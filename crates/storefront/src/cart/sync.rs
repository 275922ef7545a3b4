//! Mirrors local cart mutations to the backend.
//!
//! Calls run as detached tasks on the current tokio runtime. The cart never
//! waits for them and is never rolled back; a failed call becomes a
//! [`Notice`] for the shopper and a warning in the logs.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use super::{Cart, CartMutation};
use crate::backend::{BackendError, CartItemPayload, CartService};

/// Severity of a shopper-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A shopper-facing message (the storefront's toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

pub type NoticeSender = mpsc::UnboundedSender<Notice>;
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Create a notice channel.
#[must_use]
pub fn notice_channel() -> (NoticeSender, NoticeReceiver) {
    mpsc::unbounded_channel()
}

/// Sends cart mutations to the backend while a session token is held.
#[derive(Clone)]
pub struct SyncAdapter<B> {
    backend: B,
    token: Option<Arc<SecretString>>,
    notices: NoticeSender,
}

impl<B: CartService> SyncAdapter<B> {
    /// Create an anonymous adapter; nothing is mirrored until a token is set.
    #[must_use]
    pub const fn new(backend: B, notices: NoticeSender) -> Self {
        Self {
            backend,
            token: None,
            notices,
        }
    }

    /// Replace the session token. `None` makes the adapter anonymous.
    pub fn set_token(&mut self, token: Option<SecretString>) {
        self.token = token.map(Arc::new);
    }

    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_deref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn notices(&self) -> &NoticeSender {
        &self.notices
    }

    /// Mirror a mutation to the backend without waiting for the result.
    ///
    /// Returns the spawned task, or `None` when anonymous or when no tokio
    /// runtime is running.
    pub fn dispatch(&self, mutation: &CartMutation) -> Option<JoinHandle<()>> {
        let token = Arc::clone(self.token.as_ref()?);

        let Ok(runtime) = Handle::try_current() else {
            warn!(key = %mutation.key(), "No async runtime; cart change not synced");
            let _ = self
                .notices
                .send(Notice::error("Could not save your cart. Please try again."));
            return None;
        };

        let backend = self.backend.clone();
        let notices = self.notices.clone();
        let mutation = mutation.clone();
        let span = info_span!("cart_sync", key = %mutation.key());

        Some(runtime.spawn(
            async move {
                if let Err(e) = send_mutation(&backend, &token, &mutation).await {
                    warn!(error = %e, "Cart sync failed");
                    let _ = notices.send(Notice::error(e.to_string()));
                } else {
                    debug!("Cart sync complete");
                }
            }
            .instrument(span),
        ))
    }

    /// Fetch the server cart for the current token.
    ///
    /// Returns `Ok(None)` when anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn fetch_cart(&self) -> Result<Option<Cart>, BackendError> {
        let Some(token) = self.token.as_deref() else {
            return Ok(None);
        };
        let remote = self.backend.get_cart(token).await?;
        Ok(Some(Cart::from_remote(remote)))
    }
}

async fn send_mutation<B: CartService>(
    backend: &B,
    token: &SecretString,
    mutation: &CartMutation,
) -> Result<(), BackendError> {
    match mutation {
        CartMutation::Added(key) => {
            backend
                .add_item(token, &CartItemPayload::from_key(key))
                .await
        }
        CartMutation::Updated(key, quantity) => {
            backend
                .update_item(token, &CartItemPayload::from_key(key).with_quantity(*quantity))
                .await
        }
        CartMutation::Removed(key) => {
            backend
                .remove_item(token, &CartItemPayload::from_key(key))
                .await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use shopfront_core::CartKey;

    use super::*;
    use crate::backend::{RemoteCart, RemoteCartLine};

    #[derive(Clone, Default)]
    struct FakeCart {
        calls: Arc<Mutex<Vec<(String, CartItemPayload)>>>,
        fail: bool,
    }

    impl FakeCart {
        fn record(&self, op: &str, item: &CartItemPayload) -> Result<(), BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((op.to_string(), item.clone()));
            if self.fail {
                Err(BackendError::Rejected("Cart unavailable".to_string()))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<(String, CartItemPayload)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CartService for FakeCart {
        async fn get_cart(&self, _token: &SecretString) -> Result<RemoteCart, BackendError> {
            let mut remote = RemoteCart::new();
            remote.insert(
                "p1-red--".to_string(),
                RemoteCartLine {
                    quantity: json!(3),
                    color: Some("red".to_string()),
                    size: None,
                    volume: None,
                },
            );
            remote.insert(
                "p2---".to_string(),
                RemoteCartLine {
                    quantity: json!(null),
                    color: None,
                    size: None,
                    volume: None,
                },
            );
            Ok(remote)
        }

        async fn add_item(
            &self,
            _token: &SecretString,
            item: &CartItemPayload,
        ) -> Result<(), BackendError> {
            self.record("add", item)
        }

        async fn update_item(
            &self,
            _token: &SecretString,
            item: &CartItemPayload,
        ) -> Result<(), BackendError> {
            self.record("update", item)
        }

        async fn remove_item(
            &self,
            _token: &SecretString,
            item: &CartItemPayload,
        ) -> Result<(), BackendError> {
            self.record("remove", item)
        }
    }

    fn token() -> Option<SecretString> {
        Some(SecretString::from("tok-123".to_string()))
    }

    #[tokio::test]
    async fn test_anonymous_dispatch_is_noop() {
        let backend = FakeCart::default();
        let (tx, mut rx) = notice_channel();
        let adapter = SyncAdapter::new(backend.clone(), tx);

        let handle = adapter.dispatch(&CartMutation::Added(CartKey::plain("p1")));
        assert!(handle.is_none());
        assert!(backend.calls().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dispatch_maps_mutations_to_calls() {
        let backend = FakeCart::default();
        let (tx, _rx) = notice_channel();
        let mut adapter = SyncAdapter::new(backend.clone(), tx);
        adapter.set_token(token());

        let key = CartKey::new("p1", "red", "M", "");
        for mutation in [
            CartMutation::Added(key.clone()),
            CartMutation::Updated(key.clone(), 5),
            CartMutation::Removed(key.clone()),
        ] {
            adapter.dispatch(&mutation).unwrap().await.unwrap();
        }

        let calls = backend.calls();
        let ops: Vec<&str> = calls.iter().map(|(op, _)| op.as_str()).collect();
        assert_eq!(ops, vec!["add", "update", "remove"]);

        let (_, update) = &calls[1];
        assert_eq!(update.item_id.as_str(), "p1");
        assert_eq!(update.color, "red");
        assert_eq!(update.size, "M");
        assert_eq!(update.quantity, Some(5));
        assert_eq!(calls[0].1.quantity, None);
    }

    #[tokio::test]
    async fn test_failed_sync_sends_notice() {
        let backend = FakeCart {
            fail: true,
            ..FakeCart::default()
        };
        let (tx, mut rx) = notice_channel();
        let mut adapter = SyncAdapter::new(backend, tx);
        adapter.set_token(token());

        adapter
            .dispatch(&CartMutation::Added(CartKey::plain("p1")))
            .unwrap()
            .await
            .unwrap();

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("Cart unavailable"));
    }

    #[test]
    fn test_dispatch_without_runtime_notifies() {
        let (tx, mut rx) = notice_channel();
        let mut adapter = SyncAdapter::new(FakeCart::default(), tx);
        adapter.set_token(token());

        assert!(
            adapter
                .dispatch(&CartMutation::Added(CartKey::plain("p1")))
                .is_none()
        );
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_fetch_cart_hydrates_valid_lines() {
        let (tx, _rx) = notice_channel();
        let mut adapter = SyncAdapter::new(FakeCart::default(), tx);
        assert!(adapter.fetch_cart().await.unwrap().is_none());

        adapter.set_token(token());
        let cart = adapter.fetch_cart().await.unwrap().unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.get(&CartKey::new("p1", "red", "", "")).unwrap().quantity,
            3
        );
    }
}
