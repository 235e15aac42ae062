//! Catalog gateway.
//!
//! Applies the store front's failure policy on top of [`CatalogClient`]:
//!
//! | Operation  | On upstream failure                          |
//! |------------|----------------------------------------------|
//! | list       | empty listing, logged                        |
//! | categories | empty choice set, logged                     |
//! | create     | non-field form error, caller re-renders      |
//! | update     | non-field form error, caller re-renders      |
//! | delete     | logged and swallowed                         |

use tracing::{info, warn};

use platzi_core::ProductId;

use crate::catalog::{CatalogClient, CatalogError, Product, ProductPayload};
use crate::forms::{CategoryChoice, FormErrors, ProductForm};

/// Pseudo-category that disables the category filter.
pub const ALL_CATEGORIES: &str = "All";

/// Non-field error shown when the upstream create fails.
pub const CREATE_FAILED: &str = "Could not create the product in the catalog API.";

/// Non-field error shown when the upstream update fails.
pub const UPDATE_FAILED: &str = "Could not update the product.";

/// A filtered product list plus what the filter bar needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListing {
    pub products: Vec<Product>,
    /// `All` followed by every distinct category name, sorted.
    pub categories: Vec<String>,
    pub selected: String,
    pub query: String,
}

/// Catalog gateway over a borrowed client.
pub struct CatalogService<'a> {
    client: &'a CatalogClient,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(client: &'a CatalogClient) -> Self {
        Self { client }
    }

    /// Fetch everything, then filter locally by category and search text.
    ///
    /// Upstream failures produce an empty listing rather than an error.
    pub async fn list(&self, category: Option<&str>, query: Option<&str>) -> ProductListing {
        let products = match self.client.list_products().await {
            Ok(products) => products,
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "Product list unavailable");
                Vec::new()
            }
        };

        let selected = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(ALL_CATEGORIES)
            .to_string();
        let query = query.unwrap_or_default().trim().to_string();

        let categories = category_names(&products);
        let products = filter_products(products, &selected, &query);

        ProductListing {
            products,
            categories,
            selected,
            query,
        }
    }

    /// Category choices for the product form; empty on upstream failure.
    pub async fn category_choices(&self) -> Vec<CategoryChoice> {
        match self.client.list_categories().await {
            Ok(categories) => categories.into_iter().map(CategoryChoice::from).collect(),
            Err(e) => {
                warn!(error = %e, "Category list unavailable");
                Vec::new()
            }
        }
    }

    /// Fetch one product for the edit form.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the product cannot be fetched.
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.client.get_product(id).await
    }

    /// Validate and create a product upstream.
    ///
    /// # Errors
    ///
    /// Returns field errors when validation fails, or a single non-field
    /// error when the upstream call fails.
    pub async fn create(
        &self,
        form: &ProductForm,
        choices: &[CategoryChoice],
    ) -> Result<(), FormErrors> {
        let payload = ProductPayload::from(form.validate(choices)?);
        match self.client.create_product(&payload).await {
            Ok(()) => {
                info!(title = %payload.title, "Product created");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Product create failed");
                Err(non_field(CREATE_FAILED))
            }
        }
    }

    /// Validate and replace a product upstream.
    ///
    /// # Errors
    ///
    /// Returns field errors when validation fails, or a single non-field
    /// error when the upstream call fails.
    pub async fn update(
        &self,
        id: ProductId,
        form: &ProductForm,
        choices: &[CategoryChoice],
    ) -> Result<(), FormErrors> {
        let payload = ProductPayload::from(form.validate(choices)?);
        match self.client.update_product(id, &payload).await {
            Ok(()) => {
                info!(product_id = %id, "Product updated");
                Ok(())
            }
            Err(e) => {
                warn!(product_id = %id, error = %e, "Product update failed");
                Err(non_field(UPDATE_FAILED))
            }
        }
    }

    /// Best-effort delete. Failures are logged and otherwise ignored.
    pub async fn delete(&self, id: ProductId) {
        match self.client.delete_product(id).await {
            Ok(()) => info!(product_id = %id, "Product deleted"),
            Err(e) => warn!(product_id = %id, error = %e, "Product delete failed, ignoring"),
        }
    }
}

fn non_field(message: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add_non_field(message);
    errors
}

/// `All` followed by the sorted, distinct category names in `products`.
#[must_use]
pub fn category_names(products: &[Product]) -> Vec<String> {
    let mut names: Vec<String> = products.iter().map(|p| p.category.name.clone()).collect();
    names.sort_unstable();
    names.dedup();
    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(names)
        .collect()
}

/// Keep products in `selected` (unless it is `All`) whose id, title or
/// category name contains `query`, ignoring case. Order is preserved.
#[must_use]
pub fn filter_products(products: Vec<Product>, selected: &str, query: &str) -> Vec<Product> {
    let query = query.trim().to_lowercase();
    products
        .into_iter()
        .filter(|p| selected == ALL_CATEGORIES || p.category.name == selected)
        .filter(|p| {
            query.is_empty()
                || p.id.to_string().contains(&query)
                || p.title.to_lowercase().contains(&query)
                || p.category.name.to_lowercase().contains(&query)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::Category;
    use crate::config::CatalogConfig;
    use platzi_core::CategoryId;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn product(id: i64, title: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: 10.0,
            description: String::new(),
            category: Category {
                id: CategoryId::new(id),
                name: category.to_string(),
            },
            images: Vec::new(),
        }
    }

    fn sample() -> Vec<Product> {
        vec![product(1, "Shirt", "Clothes"), product(2, "Mug", "Home")]
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_filter_by_category() {
        assert_eq!(ids(&filter_products(sample(), "Clothes", "")), [1]);
        assert_eq!(ids(&filter_products(sample(), ALL_CATEGORIES, "")), [1, 2]);
        assert!(filter_products(sample(), "Toys", "").is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        assert_eq!(ids(&filter_products(sample(), ALL_CATEGORIES, "mug")), [2]);
        assert_eq!(ids(&filter_products(sample(), ALL_CATEGORIES, "  SHI ")), [1]);
        assert_eq!(ids(&filter_products(sample(), ALL_CATEGORIES, "home")), [2]);
        assert_eq!(ids(&filter_products(sample(), ALL_CATEGORIES, "2")), [2]);
    }

    #[test]
    fn test_filter_and_search_combine() {
        assert!(filter_products(sample(), "Clothes", "mug").is_empty());
    }

    #[test]
    fn test_category_names() {
        let mut products = sample();
        products.push(product(3, "Socks", "Clothes"));
        assert_eq!(category_names(&products), ["All", "Clothes", "Home"]);
        assert_eq!(category_names(&[]), ["All"]);
    }

    async fn service_for(server: &MockServer) -> CatalogClient {
        let config = CatalogConfig::new(&server.uri())
            .unwrap()
            .with_timeout(Duration::from_millis(300));
        CatalogClient::new(&config)
    }

    #[tokio::test]
    async fn test_list_degrades_to_empty_on_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = service_for(&server).await;
        let listing = CatalogService::new(&client).list(None, None).await;
        assert!(listing.products.is_empty());
        assert_eq!(listing.categories, ["All"]);
        assert_eq!(listing.selected, ALL_CATEGORIES);
    }

    #[tokio::test]
    async fn test_create_failure_is_non_field_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/products/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = service_for(&server).await;
        let choices = vec![CategoryChoice {
            id: CategoryId::new(1),
            name: "Clothes".to_string(),
        }];
        let form = ProductForm {
            title: "Shirt".to_string(),
            price: "9.99".to_string(),
            description: "Blue".to_string(),
            category: "1".to_string(),
            image: "https://img.example.com/shirt.png".to_string(),
        };

        let errors = CatalogService::new(&client)
            .create(&form, &choices)
            .await
            .unwrap_err();
        assert_eq!(errors.non_field(), [CREATE_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_delete_swallows_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/products/5"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = service_for(&server).await;
        CatalogService::new(&client).delete(ProductId::new(5)).await;
    }
}
