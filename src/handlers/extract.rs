//! Request-scoped extraction: the records named by the path, loaded before the
//! handler runs, and submitted form bodies.

use crate::{
    entities::{item, product},
    errors::ServiceError,
    handlers::common::parse_id,
    AppState,
};
use async_trait::async_trait;
use axum::{
    extract::{Form, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// The product named by `:product_id`
#[derive(Debug, Clone)]
pub struct LoadedProduct(pub product::Model);

/// The item named by `:item_id`, loaded only through the product named by `:product_id`
#[derive(Debug, Clone)]
pub struct LoadedItem {
    pub product: product::Model,
    pub item: item::Model,
}

async fn path_id(
    parts: &mut Parts,
    state: &AppState,
    segment: &str,
    kind: &str,
) -> Result<Uuid, ServiceError> {
    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|rejection| ServiceError::BadRequest(rejection.body_text()))?;

    let raw = params.get(segment).ok_or_else(|| {
        ServiceError::InternalError(format!("route has no :{segment} segment"))
    })?;
    parse_id(kind, raw)
}

#[async_trait]
impl FromRequestParts<AppState> for LoadedProduct {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let product_id = path_id(parts, state, "product_id", "Product").await?;
        let product = state.services.products.get(product_id).await?;
        debug!(product_id = %product.id, "Loaded product for request");
        Ok(Self(product))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for LoadedItem {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let LoadedProduct(product) = LoadedProduct::from_request_parts(parts, state).await?;
        let item_id = path_id(parts, state, "item_id", "Item").await?;
        let item = state
            .services
            .items
            .get_for_product(product.id, item_id)
            .await?;
        debug!(item_id = %item.id, "Loaded item for request");
        Ok(Self { product, item })
    }
}

/// A url-encoded form body. Missing or wrong content types and undecodable bodies
/// are reported as [`ServiceError::BadRequest`].
#[derive(Debug, Clone)]
pub struct SubmittedForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for SubmittedForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(request, state)
            .await
            .map_err(|rejection| {
                debug!(status = %rejection.status(), "Rejected form body");
                ServiceError::BadRequest(rejection.body_text())
            })?;
        Ok(Self(value))
    }
}
