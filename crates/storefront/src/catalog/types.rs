//! Wire types for the upstream catalog API.
//!
//! Inbound types are lenient: missing fields fall back to defaults so one
//! malformed product does not hide the rest of the listing.

use serde::{Deserialize, Serialize};

use platzi_core::{CategoryId, ProductId};

/// A product as returned by `GET products/` and `GET products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    /// Image URLs in display order.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// First image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A product category (`GET categories/`, and nested in each product).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
}

/// Request body for `POST products/` and `PUT products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category_id: CategoryId,
    pub images: Vec<String>,
}
