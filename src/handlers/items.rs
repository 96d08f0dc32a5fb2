use crate::{
    entities::{item, ItemStatus},
    errors::ServiceError,
    flash::{FlashRedirect, IncomingFlash},
    handlers::{
        common::{item_path, product_path, view, FormView},
        extract::{LoadedItem, LoadedProduct, SubmittedForm},
        products::ProductView,
    },
    services::items::{ItemParams, PERMITTED_FIELDS},
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub size: String,
    pub color: String,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&item::Model> for ItemView {
    fn from(model: &item::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            size: model.size.clone(),
            color: model.color.clone(),
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Item together with the product that owns it
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDetailView {
    pub product: ProductView,
    pub item: ItemView,
}

/// Creates the router for item endpoints, nested under their product
pub fn items_routes() -> Router<AppState> {
    Router::new()
        .route("/products/:product_id/items", post(create_item))
        .route("/products/:product_id/items/new", get(new_item))
        .route(
            "/products/:product_id/items/:item_id",
            get(get_item)
                .put(update_item)
                .patch(update_item)
                .delete(delete_item),
        )
        .route("/products/:product_id/items/:item_id/edit", get(edit_item))
}

fn items_path(product_id: Uuid) -> String {
    format!("{}/items", product_path(product_id))
}

/// Blank item form for a product
#[utoipa::path(
    get,
    path = "/products/{product_id}/items/new",
    params(("product_id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Form for a new item", body = crate::ApiResponse<FormView<ItemParams>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn new_item(flash: IncomingFlash, LoadedProduct(product): LoadedProduct) -> Response {
    let form = FormView::new(
        items_path(product.id),
        "post",
        ItemParams::default(),
        &PERMITTED_FIELDS,
    );
    view(flash, form)
}

/// Show an item of a product
#[utoipa::path(
    get,
    path = "/products/{product_id}/items/{item_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product id"),
        ("item_id" = Uuid, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item found", body = crate::ApiResponse<ItemDetailView>),
        (status = 404, description = "Product or item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn get_item(flash: IncomingFlash, loaded: LoadedItem) -> Response {
    let detail = ItemDetailView {
        product: ProductView::from(&loaded.product),
        item: ItemView::from(&loaded.item),
    };
    view(flash, detail)
}

/// Item form filled with current values
#[utoipa::path(
    get,
    path = "/products/{product_id}/items/{item_id}/edit",
    params(
        ("product_id" = Uuid, Path, description = "Product id"),
        ("item_id" = Uuid, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Form for editing the item", body = crate::ApiResponse<FormView<ItemParams>>),
        (status = 404, description = "Product or item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn edit_item(flash: IncomingFlash, LoadedItem { item, .. }: LoadedItem) -> Response {
    let values = ItemParams {
        size: Some(item.size.clone()),
        color: Some(item.color.clone()),
        status: Some(item.status.to_string()),
    };
    let form = FormView::new(
        item_path(item.product_id, item.id),
        "patch",
        values,
        &PERMITTED_FIELDS,
    );
    view(flash, form)
}

/// Create an item under a product from a form submission
#[utoipa::path(
    post,
    path = "/products/{product_id}/items",
    params(("product_id" = Uuid, Path, description = "Product id")),
    request_body(content = ItemParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Redirect to the item, or back to the form with an error flash"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    LoadedProduct(product): LoadedProduct,
    SubmittedForm(params): SubmittedForm<ItemParams>,
) -> Result<FlashRedirect, ServiceError> {
    match state.services.items.create(&product, params).await {
        Ok(item) => Ok(FlashRedirect::to(item_path(product.id, item.id))
            .with_notice("Successfully created item.")),
        Err(err @ ServiceError::ValidationError(_)) => Ok(FlashRedirect::to(format!(
            "{}/new",
            items_path(product.id)
        ))
        .with_error(err.flash_message())),
        Err(err) => Err(err),
    }
}

/// Update an item from a form submission
#[utoipa::path(
    patch,
    path = "/products/{product_id}/items/{item_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product id"),
        ("item_id" = Uuid, Path, description = "Item id")
    ),
    request_body(content = ItemParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Redirect to the item, or back to the edit form with an error flash"),
        (status = 404, description = "Product or item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    LoadedItem { product, item }: LoadedItem,
    SubmittedForm(params): SubmittedForm<ItemParams>,
) -> Result<FlashRedirect, ServiceError> {
    let item_id = item.id;
    match state.services.items.update(item, params).await {
        Ok(item) => Ok(FlashRedirect::to(item_path(product.id, item.id))
            .with_notice("Successfully updated item.")),
        Err(err @ ServiceError::ValidationError(_)) => Ok(FlashRedirect::to(format!(
            "{}/edit",
            item_path(product.id, item_id)
        ))
        .with_error(err.flash_message())),
        Err(err) => Err(err),
    }
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/products/{product_id}/items/{item_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product id"),
        ("item_id" = Uuid, Path, description = "Item id")
    ),
    responses(
        (status = 302, description = "Redirect to the owning product"),
        (status = 404, description = "Product or item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    LoadedItem { product, item }: LoadedItem,
) -> Result<FlashRedirect, ServiceError> {
    state.services.items.delete(item).await?;
    Ok(FlashRedirect::to(product_path(product.id)).with_notice("Successfully deleted item."))
}
