use utoipa::{
    openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory API",
        version = "1.0.0",
        description = r#"
# Inventory Bookkeeping API

Products (inventory masters) and the stock transactions recorded against them.

## Authentication

Every inventory endpoint accepts HTTP Basic credentials or a bearer token
obtained from `POST /token`:

```
Authorization: Basic <base64 user:password>
Authorization: Bearer <jwt>
```

Reads and creates are open to the ADMIN and USER roles. Updates and deletes
require ADMIN.

## Errors

Failures use a single JSON shape:

```json
{
  "error": "Not Found",
  "message": "Product not found with id 42",
  "request_id": "5b0c...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "inventory", description = "Products and their transactions"),
        (name = "auth", description = "Bearer token issuance"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::inventory::get_all_inventories,
        crate::handlers::inventory::get_inventory_by_id,
        crate::handlers::inventory::get_inventory_by_filters,
        crate::handlers::inventory::create_inventory,
        crate::handlers::inventory::update_inventory,
        crate::handlers::inventory::delete_inventory,
        crate::handlers::inventory::create_inventory_details,
        crate::handlers::inventory::update_inventory_detail,
        crate::handlers::inventory::delete_inventory_detail,
        crate::auth::issue_token_handler,
        crate::health::health_check,
    ),
    components(
        schemas(
            crate::models::InventoryMaster,
            crate::models::InventoryMasterDraft,
            crate::models::InventoryDetailsDraft,
            crate::models::MasterReference,
            crate::entities::inventory_master::Model,
            crate::entities::inventory_details::Model,
            crate::entities::TransactionStatus,
            crate::auth::TokenResponse,
            crate::auth::Role,
            crate::health::HealthInfo,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from(OPENAPI_JSON_PATH).try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_inventory_route() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();

        assert!(json.contains("Inventory API"));
        for path in [
            "/inventory/all",
            "/inventory/filter",
            "/inventory/{id}",
            "/inventory/details",
            "/inventory/details/{id}",
            "/token",
            "/health",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(json.contains("bearer_auth"));
        assert!(json.contains("basic_auth"));
    }
}
