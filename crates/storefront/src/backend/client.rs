//! HTTP implementation of the backend services.
//!
//! Uses `reqwest` for HTTP and caches the product list using `moka`.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shopfront_core::{OrderId, Product, UserId};
use tracing::{debug, instrument};
use url::Url;

use super::types::{
    Acknowledgement, CartDataResponse, CartItemPayload, LoginRequest, LoginResponse, OrderDraft,
    OrderRecord, OrdersResponse, ProductListResponse, RemoteCart, StripeSessionResponse,
    UserOrdersRequest, VerifyStripeRequest,
};
use super::{AuthService, BackendError, CartService, CatalogService, OrderService};
use crate::config::BackendConfig;

/// Header carrying the session token on authenticated calls.
const TOKEN_HEADER: &str = "token";

/// Cache key for the full product list.
const PRODUCTS_CACHE_KEY: &str = "products";

/// Longest slice of a response body kept in errors and logs.
const BODY_EXCERPT_LEN: usize = 200;

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the storefront REST backend.
///
/// Cheaply cloneable; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<&'static str, Arc<Vec<Product>>>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// Drop the cached product list so the next listing hits the backend.
    pub async fn invalidate_products(&self) {
        self.inner.products.invalidate(PRODUCTS_CACHE_KEY).await;
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// GET `path` and decode the envelope.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.get(url).send().await?;
        decode_envelope(response).await
    }

    /// POST `body` to `path` and decode the envelope.
    async fn post<B, T>(
        &self,
        path: &str,
        token: Option<&SecretString>,
        body: &B,
    ) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut request = self.inner.client.post(url).json(body);
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token.expose_secret());
        }

        let response = request.send().await?;
        decode_envelope(response).await
    }
}

/// Check the HTTP status, then the `success` flag, then decode the payload.
async fn decode_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BackendError::Unauthorized);
    }

    // Get response body as text first for better error diagnostics
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %excerpt(&body),
            "Backend returned non-success status"
        );
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: excerpt(&body),
        });
    }

    let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %excerpt(&body),
            "Failed to parse backend response"
        );
        e
    })?;

    if !value
        .get("success")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
    {
        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("request was not successful")
            .to_string();
        debug!(%message, "Backend rejected request");
        return Err(BackendError::Rejected(message));
    }

    Ok(serde_json::from_value(value)?)
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}

// =============================================================================
// Service Implementations
// =============================================================================

impl CatalogService for BackendClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(products) = self.inner.products.get(PRODUCTS_CACHE_KEY).await {
            debug!(count = products.len(), "Product list cache hit");
            return Ok(products.as_ref().clone());
        }

        let response: ProductListResponse = self.get("api/product/list").await?;
        debug!(count = response.products.len(), "Fetched product list");

        let products = Arc::new(response.products);
        self.inner
            .products
            .insert(PRODUCTS_CACHE_KEY, Arc::clone(&products))
            .await;

        Ok(Arc::unwrap_or_clone(products))
    }
}

impl CartService for BackendClient {
    #[instrument(skip_all)]
    async fn get_cart(&self, token: &SecretString) -> Result<RemoteCart, BackendError> {
        let response: CartDataResponse = self
            .post("api/cart/get", Some(token), &serde_json::json!({}))
            .await?;
        Ok(response.cart_data)
    }

    #[instrument(skip(self, token), fields(item = %item.item_id))]
    async fn add_item(
        &self,
        token: &SecretString,
        item: &CartItemPayload,
    ) -> Result<(), BackendError> {
        let _: Acknowledgement = self.post("api/cart/add", Some(token), item).await?;
        Ok(())
    }

    #[instrument(skip(self, token), fields(item = %item.item_id))]
    async fn update_item(
        &self,
        token: &SecretString,
        item: &CartItemPayload,
    ) -> Result<(), BackendError> {
        let _: Acknowledgement = self.post("api/cart/update", Some(token), item).await?;
        Ok(())
    }

    #[instrument(skip(self, token), fields(item = %item.item_id))]
    async fn remove_item(
        &self,
        token: &SecretString,
        item: &CartItemPayload,
    ) -> Result<(), BackendError> {
        let _: Acknowledgement = self.post("api/cart/remove", Some(token), item).await?;
        Ok(())
    }
}

impl OrderService for BackendClient {
    #[instrument(skip_all, fields(items = order.items.len()))]
    async fn place_cod(
        &self,
        token: Option<&SecretString>,
        order: &OrderDraft,
    ) -> Result<String, BackendError> {
        let ack: Acknowledgement = self.post("api/order/place/cod", token, order).await?;
        Ok(ack
            .message
            .unwrap_or_else(|| "Order placed successfully!".to_string()))
    }

    #[instrument(skip_all, fields(items = order.items.len()))]
    async fn place_stripe(
        &self,
        token: &SecretString,
        order: &OrderDraft,
    ) -> Result<String, BackendError> {
        let response: StripeSessionResponse = self
            .post("api/order/place/stripe", Some(token), order)
            .await?;
        Ok(response.session_url)
    }

    #[instrument(skip(self, token))]
    async fn verify_stripe(
        &self,
        token: &SecretString,
        order_id: &OrderId,
        success: bool,
    ) -> Result<(), BackendError> {
        let body = VerifyStripeRequest {
            success: if success { "true" } else { "false" },
            order_id,
        };
        let _: Acknowledgement = self
            .post("api/order/verifyStripe", Some(token), &body)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn user_orders(
        &self,
        token: &SecretString,
        user_id: &UserId,
    ) -> Result<Vec<OrderRecord>, BackendError> {
        let response: OrdersResponse = self
            .post(
                "api/order/userorders",
                Some(token),
                &UserOrdersRequest { user_id },
            )
            .await?;
        Ok(response.orders)
    }
}

impl AuthService for BackendClient {
    #[instrument(skip(self, password))]
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, BackendError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        self.post("api/user/login", None, &body).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> BackendClient {
        BackendClient::new(&BackendConfig::new("http://127.0.0.1:4000/shop").unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let url = client().endpoint("api/cart/add").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4000/shop/api/cart/add");
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let body = "x".repeat(BODY_EXCERPT_LEN * 2);
        assert_eq!(excerpt(&body).len(), BODY_EXCERPT_LEN);
        assert_eq!(excerpt("short"), "short");
    }
}
