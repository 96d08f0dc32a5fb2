use crate::{
    errors::ServiceError,
    flash::{clear_flash_cookie, FlashKind, IncomingFlash},
    ApiResponse,
};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Renders a JSON view, consuming any flash message the browser sent along
pub fn view<T: Serialize>(IncomingFlash(flash): IncomingFlash, data: T) -> Response {
    let mut body = ApiResponse::success(data);
    let consumed = flash.is_some();

    if let Some(flash) = flash {
        match flash.kind {
            FlashKind::Notice => body.message = Some(flash.message),
            FlashKind::Error => body.errors = Some(vec![flash.message]),
        }
    }

    let mut response = (StatusCode::OK, Json(body)).into_response();
    if consumed {
        response
            .headers_mut()
            .append(header::SET_COOKIE, clear_flash_cookie());
    }
    response
}

/// Parses a path id; anything that is not a UUID cannot name a stored record
pub fn parse_id(kind: &str, raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::not_found(kind, raw))
}

/// Everything a client needs to render an entry form
#[derive(Debug, Serialize, ToSchema)]
pub struct FormView<T> {
    /// Where the form submits to
    pub action: String,
    /// `post` for new records; `patch` is sent as `_method` on a POST
    pub method: String,
    /// Current field values
    pub values: T,
    /// Fields the submission may set
    pub permitted: Vec<String>,
}

impl<T> FormView<T> {
    pub fn new(action: String, method: &str, values: T, permitted: &[&str]) -> Self {
        Self {
            action,
            method: method.to_string(),
            values,
            permitted: permitted.iter().map(|field| field.to_string()).collect(),
        }
    }
}

pub fn product_path(product_id: Uuid) -> String {
    format!("/products/{product_id}")
}

pub fn item_path(product_id: Uuid, item_id: Uuid) -> String {
    format!("/products/{product_id}/items/{item_id}")
}
