#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use inventory_api::{
    config::AppConfig,
    db,
    entities::{item, product},
    AppState,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::Value;
use tower::ServiceExt;
use url::form_urlencoded;
use uuid::Uuid;

/// Helper harness for spinning up the full application over an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = inventory_api::app(state.clone());

        Self { router, state }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request");
        self.send(request).await
    }

    /// GET carrying the given `Cookie` header, as a browser following a redirect would
    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .expect("failed to build request");
        self.send(request).await
    }

    /// Submit a url-encoded form
    pub async fn submit(&self, method: Method, uri: &str, fields: &[(&str, &str)]) -> Response {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("failed to build request");
        self.send(request).await
    }

    /// POST a form the way a browser does, tunnelling other verbs through `_method`
    pub async fn submit_as(&self, verb: &str, uri: &str, fields: &[(&str, &str)]) -> Response {
        let mut all = vec![("_method", verb)];
        all.extend_from_slice(fields);
        self.submit(Method::POST, uri, &all).await
    }

    pub async fn create_product(&self, fields: &[(&str, &str)]) -> product::Model {
        let response = self.submit(Method::POST, "/products", fields).await;
        let id = location(&response)
            .strip_prefix("/products/")
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("create should redirect to the new product");
        self.state
            .services
            .products
            .get(id)
            .await
            .expect("created product should be stored")
    }

    pub async fn create_item(
        &self,
        product_id: Uuid,
        size: &str,
        color: &str,
        status: &str,
    ) -> item::Model {
        let response = self
            .submit(
                Method::POST,
                &format!("/products/{product_id}/items"),
                &[("size", size), ("color", color), ("status", status)],
            )
            .await;
        let item_id = item_id_from_location(product_id, &location(&response))
            .expect("create should redirect to the new item");
        self.state
            .services
            .items
            .get_for_product(product_id, item_id)
            .await
            .expect("created item should be stored")
    }

    pub async fn item_count(&self, product_id: Uuid) -> u64 {
        item::Entity::find()
            .filter(item::Column::ProductId.eq(product_id))
            .count(&*self.state.db)
            .await
            .expect("count items")
    }

    pub async fn product_count(&self) -> u64 {
        product::Entity::find()
            .count(&*self.state.db)
            .await
            .expect("count products")
    }
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response should carry a Location header")
        .to_str()
        .expect("ascii location")
        .to_string()
}

/// The `flash=...` pair from `Set-Cookie`, ready to send back as a `Cookie` header
pub fn flash_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("flash="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Parses `/products/{product_id}/items/{uuid}`
pub fn item_id_from_location(product_id: Uuid, location: &str) -> Option<Uuid> {
    location
        .strip_prefix(&format!("/products/{product_id}/items/"))
        .and_then(|id| Uuid::parse_str(id).ok())
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
