//! Product create/edit form and its mapping to the catalog API payload.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use url::Url;

use platzi_core::CategoryId;

use super::{FormErrors, required};
use crate::catalog::{Category, Product, ProductPayload};

/// Maximum title length, in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Price precision: total digits and digits after the decimal point.
pub const PRICE_MAX_DIGITS: u32 = 10;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// One selectable category in the product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChoice {
    pub id: CategoryId,
    pub name: String,
}

impl From<Category> for CategoryChoice {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// Raw product form input. Field names match the HTML form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
}

/// A validated product, ready to send upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub title: String,
    pub price: Decimal,
    pub description: String,
    pub category_id: CategoryId,
    pub image: Url,
}

impl ProductForm {
    /// Initial values for editing an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price.to_string(),
            description: product.description.clone(),
            category: product.category.id.to_string(),
            image: product.primary_image().unwrap_or_default().to_string(),
        }
    }

    /// Validate against the category choices offered in the form.
    ///
    /// # Errors
    ///
    /// Returns `FormErrors` keyed by field name if any rule fails.
    pub fn validate(&self, choices: &[CategoryChoice]) -> Result<ProductDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let title = required(&mut errors, "title", &self.title);
        if let Some(title) = title
            && title.chars().count() > MAX_TITLE_LENGTH
        {
            errors.add(
                "title",
                format!(
                    "Ensure this value has at most {MAX_TITLE_LENGTH} characters (it has {}).",
                    title.chars().count()
                ),
            );
        }

        let price = required(&mut errors, "price", &self.price)
            .and_then(|raw| parse_price(raw).map_err(|m| errors.add("price", m)).ok());

        let description = required(&mut errors, "description", &self.description);

        let category_id = required(&mut errors, "category", &self.category).and_then(|raw| {
            parse_choice(raw, choices)
                .ok_or_else(|| {
                    errors.add(
                        "category",
                        format!("Select a valid choice. {raw} is not one of the available choices."),
                    );
                })
                .ok()
        });

        let image = required(&mut errors, "image", &self.image).and_then(|raw| {
            parse_image_url(raw)
                .ok_or_else(|| errors.add("image", "Enter a valid URL."))
                .ok()
        });

        match (title, price, description, category_id, image) {
            (Some(title), Some(price), Some(description), Some(category_id), Some(image))
                if errors.is_empty() =>
            {
                Ok(ProductDraft {
                    title: title.to_string(),
                    price,
                    description: description.to_string(),
                    category_id,
                    image,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<ProductDraft> for ProductPayload {
    fn from(draft: ProductDraft) -> Self {
        Self {
            title: draft.title,
            // Two decimal places and ten digits always fit an f64 exactly enough.
            price: draft.price.to_f64().unwrap_or_default(),
            description: draft.description,
            category_id: draft.category_id,
            images: vec![draft.image.to_string()],
        }
    }
}

/// Parse a price with at most 10 digits, 2 of them after the point.
fn parse_price(raw: &str) -> Result<Decimal, String> {
    let price = Decimal::from_str(raw).map_err(|_| "Enter a number.".to_string())?;

    let decimals = price.scale();
    let significant = digit_count(price.mantissa().unsigned_abs());
    // "0.05" has one significant digit but two decimal places.
    let digits = significant.max(decimals);
    let whole_digits = digits - decimals;

    if digits > PRICE_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."
        ));
    }
    if decimals > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
        ));
    }
    if whole_digits > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
        ));
    }

    Ok(price)
}

fn digit_count(mut n: u128) -> u32 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

fn parse_choice(raw: &str, choices: &[CategoryChoice]) -> Option<CategoryId> {
    let id = raw.parse::<CategoryId>().ok()?;
    choices.iter().any(|c| c.id == id).then_some(id)
}

/// Absolute http(s) URL with a host. Scheme-less input is read as https.
fn parse_image_url(raw: &str) -> Option<Url> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate).ok()?;
    let host_ok = url.host_str().is_some_and(|h| h.contains('.') || h == "localhost");
    (matches!(url.scheme(), "http" | "https") && host_ok).then_some(url)
}
