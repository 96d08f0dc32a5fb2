use crate::{
    entities::product,
    errors::ServiceError,
    flash::{FlashRedirect, IncomingFlash},
    handlers::{
        common::{product_path, view, FormView},
        extract::{LoadedProduct, SubmittedForm},
        items::ItemView,
    },
    services::products::{ProductParams, PERMITTED_FIELDS},
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

/// Product as rendered in views, with its margin
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductView {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sku: String,
    pub wholesale: Option<Decimal>,
    pub retail: Option<Decimal>,
    /// `null` when it cannot be computed from the current prices
    pub margin: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&product::Model> for ProductView {
    fn from(model: &product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            description: model.description.clone(),
            category: model.category.clone(),
            sku: model.sku.clone(),
            wholesale: model.wholesale,
            retail: model.retail,
            margin: model.margin().ok(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Product with its items and sell-through
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailView {
    pub product: ProductView,
    pub items: Vec<ItemView>,
    /// `null` when the product has no items
    pub sell_through: Option<Decimal>,
}

fn form_values(model: &product::Model) -> ProductParams {
    ProductParams {
        name: model.name.clone(),
        description: model.description.clone(),
        category: model.category.clone(),
        sku: Some(model.sku.clone()),
        wholesale: model.wholesale.map(|d| d.to_string()),
        retail: model.retail.map(|d| d.to_string()),
    }
}

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/products", get(list_products).post(create_product))
        .route("/products/new", get(new_product))
        .route(
            "/products/:product_id",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .route("/products/:product_id/edit", get(edit_product))
}

/// List all products
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products with their margins", body = crate::ApiResponse<Vec<ProductView>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> Result<Response, ServiceError> {
    let products = state.services.products.list().await?;
    let views: Vec<ProductView> = products.iter().map(ProductView::from).collect();
    Ok(view(flash, views))
}

/// Show a product with its items, margin and sell-through
#[utoipa::path(
    get,
    path = "/products/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = crate::ApiResponse<ProductDetailView>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    flash: IncomingFlash,
    LoadedProduct(product): LoadedProduct,
) -> Result<Response, ServiceError> {
    let items = state.services.products.items_for(product.id).await?;
    let detail = ProductDetailView {
        product: ProductView::from(&product),
        sell_through: product::sell_through(&items).ok(),
        items: items.iter().map(ItemView::from).collect(),
    };
    Ok(view(flash, detail))
}

/// Blank product form
#[utoipa::path(
    get,
    path = "/products/new",
    responses(
        (status = 200, description = "Form for a new product", body = crate::ApiResponse<FormView<ProductParams>>)
    ),
    tag = "Products"
)]
pub async fn new_product(flash: IncomingFlash) -> Response {
    let form = FormView::new(
        "/products".to_string(),
        "post",
        ProductParams::default(),
        &PERMITTED_FIELDS,
    );
    view(flash, form)
}

/// Product form filled with current values
#[utoipa::path(
    get,
    path = "/products/{product_id}/edit",
    params(("product_id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Form for editing the product", body = crate::ApiResponse<FormView<ProductParams>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn edit_product(
    flash: IncomingFlash,
    LoadedProduct(product): LoadedProduct,
) -> Response {
    let form = FormView::new(
        product_path(product.id),
        "patch",
        form_values(&product),
        &PERMITTED_FIELDS,
    );
    view(flash, form)
}

/// Create a product from a form submission
#[utoipa::path(
    post,
    path = "/products",
    request_body(content = ProductParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Redirect to the product, or back to the form with an error flash")
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    SubmittedForm(params): SubmittedForm<ProductParams>,
) -> Result<FlashRedirect, ServiceError> {
    match state.services.products.create(params).await {
        Ok(product) => Ok(FlashRedirect::to(product_path(product.id))
            .with_notice("Successfully created product.")),
        Err(err @ ServiceError::ValidationError(_)) => {
            Ok(FlashRedirect::to("/products/new").with_error(err.flash_message()))
        }
        Err(err) => Err(err),
    }
}

/// Update a product from a form submission
#[utoipa::path(
    patch,
    path = "/products/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product id")),
    request_body(content = ProductParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Redirect to the product, or back to the edit form with an error flash"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    LoadedProduct(product): LoadedProduct,
    SubmittedForm(params): SubmittedForm<ProductParams>,
) -> Result<FlashRedirect, ServiceError> {
    let product_id = product.id;
    match state.services.products.update(product, params).await {
        Ok(product) => Ok(FlashRedirect::to(product_path(product.id))
            .with_notice("Successfully updated product.")),
        Err(err @ ServiceError::ValidationError(_)) => Ok(FlashRedirect::to(format!(
            "{}/edit",
            product_path(product_id)
        ))
        .with_error(err.flash_message())),
        Err(err) => Err(err),
    }
}

/// Delete a product and all of its items
#[utoipa::path(
    delete,
    path = "/products/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 302, description = "Redirect to the product index"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    LoadedProduct(product): LoadedProduct,
) -> Result<FlashRedirect, ServiceError> {
    let items_removed = state.services.products.delete(product.id).await?;
    info!(product_id = %product.id, items_removed, "Product removed via form");
    Ok(FlashRedirect::to("/").with_notice("Successfully deleted product."))
}
