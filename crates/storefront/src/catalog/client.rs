//! HTTP client implementation for the catalog API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use platzi_core::ProductId;

use super::CatalogError;
use super::types::{Category, Product, ProductPayload};
use crate::config::CatalogConfig;

/// Client for the catalog REST API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                config: config.clone(),
            }),
        }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        timeout: Duration,
    ) -> Result<RequestBuilder, CatalogError> {
        let url = self.inner.config.base_url.join(path)?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .header("Accept", "application/json")
            .timeout(timeout))
    }

    /// Send a request and fail on any non-2xx status. Returns the body text.
    async fn send(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<String, CatalogError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                operation,
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status { operation, status });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, CatalogError> {
        let body = self.send(request, operation).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                operation,
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e)
        })
    }

    /// Fetch the full product list. The API is not paginated here.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, timeout, non-2xx status,
    /// or an unparseable body.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let request = self.request(Method::GET, "products/", self.inner.config.list_timeout)?;
        let products: Vec<Product> = self.send_json(request, "GET products/").await?;
        debug!(count = products.len(), "Fetched product list");
        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, timeout, non-2xx status,
    /// or an unparseable body.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let request = self.request(
            Method::GET,
            &format!("products/{id}"),
            self.inner.config.item_timeout,
        )?;
        self.send_json(request, "GET products/{id}").await
    }

    /// Fetch every category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, timeout, non-2xx status,
    /// or an unparseable body.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let request = self.request(
            Method::GET,
            "categories/",
            self.inner.config.write_timeout,
        )?;
        self.send_json(request, "GET categories/").await
    }

    /// Create a product. The response body is not inspected.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, timeout, or non-2xx status.
    #[instrument(skip(self, payload), fields(title = %payload.title))]
    pub async fn create_product(&self, payload: &ProductPayload) -> Result<(), CatalogError> {
        let request = self
            .request(Method::POST, "products/", self.inner.config.write_timeout)?
            .json(payload);
        self.send(request, "POST products/").await?;
        Ok(())
    }

    /// Replace a product with `payload`. The response body is not inspected.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, timeout, or non-2xx status.
    #[instrument(skip(self, payload))]
    pub async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<(), CatalogError> {
        let request = self
            .request(
                Method::PUT,
                &format!("products/{id}"),
                self.inner.config.item_timeout,
            )?
            .json(payload);
        self.send(request, "PUT products/{id}").await?;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, timeout, or non-2xx status.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        let request = self.request(
            Method::DELETE,
            &format!("products/{id}"),
            self.inner.config.item_timeout,
        )?;
        self.send(request, "DELETE products/{id}").await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platzi_core::CategoryId;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> CatalogClient {
        let config = CatalogConfig::new(&format!("{}/api/v1", server.uri()))
            .unwrap()
            .with_timeout(Duration::from_millis(500));
        CatalogClient::new(&config)
    }

    #[tokio::test]
    async fn test_list_products_parses_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Shirt", "price": 10, "category": {"id": 1, "name": "Clothes"}},
                {"id": 2, "title": "Mug", "price": 5.5, "category": {"id": 2, "name": "Home"}}
            ])))
            .mount(&server)
            .await;

        let products = client_for(&server).await.list_products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].title, "Mug");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products/99"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .get_product(ProductId::new(99))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/categories/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .list_categories()
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_create_sends_payload() {
        let server = MockServer::start().await;
        let payload = ProductPayload {
            title: "Lamp".to_string(),
            price: 12.5,
            description: "Bright".to_string(),
            category_id: CategoryId::new(3),
            images: vec!["https://img.example.com/lamp.png".to_string()],
        };
        Mock::given(method("POST"))
            .and(path("/api/v1/products/"))
            .and(body_json(json!({
                "title": "Lamp",
                "price": 12.5,
                "description": "Bright",
                "categoryId": 3,
                "images": ["https://img.example.com/lamp.png"],
            })))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .await
            .create_product(&payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_garbage_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_products().await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
