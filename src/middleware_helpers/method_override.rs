use crate::errors::ServiceError;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Form field carrying the intended HTTP method
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Largest form body buffered while looking for an override; set from `max_body_size`
#[derive(Debug, Clone, Copy)]
pub struct FormBodyLimit(pub usize);

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn overridden_method(body: &[u8]) -> Option<Method> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == METHOD_OVERRIDE_FIELD)
        .and_then(|(_, value)| match value.to_ascii_uppercase().as_str() {
            "PUT" => Some(Method::PUT),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        })
}

/// Lets HTML forms, which can only submit GET and POST, reach PUT/PATCH/DELETE routes.
///
/// Must wrap the whole router: method dispatch happens inside route handlers, so a
/// per-route layer would see the request too late.
pub async fn method_override_middleware(
    State(FormBodyLimit(limit)): State<FormBodyLimit>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::POST || !is_form(&request) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(error = %err, limit, "unreadable form body");
            return ServiceError::BadRequest(format!("Unreadable form body: {err}"))
                .into_response();
        }
    };

    if let Some(method) = overridden_method(&bytes) {
        debug!(%method, uri = %parts.uri, "method override applied");
        parts.method = method;
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
