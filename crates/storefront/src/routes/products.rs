//! Product route handlers.
//!
//! Every page reads fresh from the catalog API; nothing is cached between
//! requests.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use platzi_core::ProductId;

use super::Layout;
use crate::catalog::Product;
use crate::filters;
use crate::forms::{CategoryChoice, FormErrors, ProductForm};
use crate::middleware::OptionalAuth;
use crate::services::catalog::ProductListing;
use crate::state::AppState;

/// Where every successful write, and every failed edit lookup, ends up.
pub const PRODUCT_LIST_PATH: &str = "/productos/";

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image: Option<String>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let image = product.primary_image().map(str::to_string);
        Self {
            id: product.id,
            title: product.title,
            description: product.description,
            price: format!("{:.2}", product.price),
            category: product.category.name,
            image,
        }
    }
}

/// One entry of the category filter bar.
#[derive(Clone)]
pub struct CategoryFilterView {
    pub name: String,
    pub selected: bool,
}

/// One `<option>` of the category select.
#[derive(Clone)]
pub struct ChoiceView {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

fn choice_views(choices: &[CategoryChoice], current: &str) -> Vec<ChoiceView> {
    let current = current.trim();
    choices
        .iter()
        .map(|c| {
            let id = c.id.to_string();
            ChoiceView {
                selected: id == current,
                id,
                name: c.name.clone(),
            }
        })
        .collect()
}

/// Listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/list.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryFilterView>,
    pub selected: String,
    pub query: String,
}

impl ProductsIndexTemplate {
    fn new(layout: Layout, listing: ProductListing) -> Self {
        let categories = listing
            .categories
            .into_iter()
            .map(|name| CategoryFilterView {
                selected: name == listing.selected,
                name,
            })
            .collect();

        Self {
            layout,
            products: listing.products.into_iter().map(ProductView::from).collect(),
            categories,
            selected: listing.selected,
            query: listing.query,
        }
    }
}

/// New product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/create.html")]
pub struct ProductCreateTemplate {
    pub layout: Layout,
    pub form: ProductForm,
    pub choices: Vec<ChoiceView>,
    pub errors: FormErrors,
}

/// Edit product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/update.html")]
pub struct ProductUpdateTemplate {
    pub layout: Layout,
    pub product_id: ProductId,
    pub form: ProductForm,
    pub choices: Vec<ChoiceView>,
    pub errors: FormErrors,
}

/// Display product listing page, filtered by `category` and `q`.
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let listing = state
        .catalog()
        .list(query.category.as_deref(), query.q.as_deref())
        .await;

    ProductsIndexTemplate::new(Layout::load(&session, user.as_ref()).await, listing)
}

/// Display the new product form.
pub async fn new(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let choices = state.catalog().category_choices().await;
    let form = ProductForm::default();

    ProductCreateTemplate {
        layout: Layout::load(&session, user.as_ref()).await,
        choices: choice_views(&choices, &form.category),
        form,
        errors: FormErrors::new(),
    }
}

/// Handle new product submission.
///
/// Redirects to the listing on success, otherwise re-renders with errors.
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<ProductForm>,
) -> Response {
    let catalog = state.catalog();
    let choices = catalog.category_choices().await;

    match catalog.create(&form, &choices).await {
        Ok(()) => Redirect::to(PRODUCT_LIST_PATH).into_response(),
        Err(errors) => ProductCreateTemplate {
            layout: Layout::load(&session, user.as_ref()).await,
            choices: choice_views(&choices, &form.category),
            form,
            errors,
        }
        .into_response(),
    }
}

/// Display the edit form, pre-filled from the catalog.
///
/// Redirects to the listing if the product cannot be fetched.
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Response {
    let catalog = state.catalog();
    let product = match catalog.product(id).await {
        Ok(product) => product,
        Err(e) if e.is_not_found() => {
            tracing::info!(product_id = %id, "Product not found for edit");
            return Redirect::to(PRODUCT_LIST_PATH).into_response();
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Product unavailable for edit");
            return Redirect::to(PRODUCT_LIST_PATH).into_response();
        }
    };
    let choices = catalog.category_choices().await;
    let form = ProductForm::from_product(&product);

    ProductUpdateTemplate {
        layout: Layout::load(&session, user.as_ref()).await,
        product_id: id,
        choices: choice_views(&choices, &form.category),
        form,
        errors: FormErrors::new(),
    }
    .into_response()
}

/// Handle edit submission with a full replacement of the product.
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Response {
    let catalog = state.catalog();
    if let Err(e) = catalog.product(id).await {
        tracing::warn!(product_id = %id, error = %e, "Product unavailable for update");
        return Redirect::to(PRODUCT_LIST_PATH).into_response();
    }
    let choices = catalog.category_choices().await;

    match catalog.update(id, &form, &choices).await {
        Ok(()) => Redirect::to(PRODUCT_LIST_PATH).into_response(),
        Err(errors) => ProductUpdateTemplate {
            layout: Layout::load(&session, user.as_ref()).await,
            product_id: id,
            choices: choice_views(&choices, &form.category),
            form,
            errors,
        }
        .into_response(),
    }
}

/// `GET` on the delete URL never deletes.
pub async fn delete_redirect() -> Redirect {
    Redirect::to(PRODUCT_LIST_PATH)
}

/// Delete a product. Always redirects to the listing, even if the catalog
/// API refused the delete.
pub async fn delete(State(state): State<AppState>, Path(id): Path<ProductId>) -> Redirect {
    state.catalog().delete(id).await;
    Redirect::to(PRODUCT_LIST_PATH)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use platzi_core::CategoryId;

    use super::*;
    use crate::catalog::Category;

    #[test]
    fn test_product_view_formats_price() {
        let view = ProductView::from(Product {
            id: ProductId::new(3),
            title: "Mug".to_string(),
            price: 12.5,
            description: String::new(),
            category: Category {
                id: CategoryId::new(2),
                name: "Home".to_string(),
            },
            images: vec!["https://img.example.com/mug.png".to_string()],
        });
        assert_eq!(view.price, "12.50");
        assert_eq!(view.category, "Home");
        assert_eq!(view.image.as_deref(), Some("https://img.example.com/mug.png"));
    }

    #[test]
    fn test_choice_views_mark_current() {
        let choices = vec![
            CategoryChoice {
                id: CategoryId::new(1),
                name: "Clothes".to_string(),
            },
            CategoryChoice {
                id: CategoryId::new(2),
                name: "Home".to_string(),
            },
        ];
        let views = choice_views(&choices, " 2 ");
        assert!(!views[0].selected);
        assert!(views[1].selected);
        assert!(choice_views(&choices, "").iter().all(|v| !v.selected));
    }
}
