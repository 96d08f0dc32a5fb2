use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory API",
        version = "0.1.0",
        description = r#"
# Inventory API

Tracks products and the physical items stocked for each of them.

## Forms

Mutating endpoints accept `application/x-www-form-urlencoded` bodies and answer
with `302 Found`. The `Location` header names the next page and a `flash`
cookie carries the outcome (`notice=...` or `error=...`). The next GET view
returns that message once and clears the cookie.

Browsers only submit GET and POST forms, so a POST carrying
`_method=put`, `_method=patch` or `_method=delete` is dispatched as that method.

## Derived figures

- `margin`: `100 * (retail - wholesale) / retail`
- `sell_through`: sold items over all items

Both are exact decimals and are `null` when they cannot be computed.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Product endpoints"),
        (name = "Items", description = "Item endpoints, nested under their product")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::new_product,
        crate::handlers::products::edit_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Items
        crate::handlers::items::new_item,
        crate::handlers::items::get_item,
        crate::handlers::items::edit_item,
        crate::handlers::items::create_item,
        crate::handlers::items::update_item,
        crate::handlers::items::delete_item,
    ),
    components(
        schemas(
            // Product types
            crate::handlers::products::ProductView,
            crate::handlers::products::ProductDetailView,
            crate::services::products::ProductParams,

            // Item types
            crate::handlers::items::ItemView,
            crate::handlers::items::ItemDetailView,
            crate::services::items::ItemParams,
            crate::entities::ItemStatus,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_nested_item_routes() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Inventory API"));
        assert!(json.contains("/products/{product_id}"));
        assert!(json.contains("/products/{product_id}/items/{item_id}"));
        assert!(json.contains("application/x-www-form-urlencoded"));
    }
}
