use crate::{
    db::inventory_filter::InventoryFilterCriteria,
    entities::inventory_details,
    errors::{ErrorResponse, ServiceError},
    models::{InventoryDetailsDraft, InventoryMaster, InventoryMasterDraft},
    services::inventory::InventoryService,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use validator::Validate;

/// Access to the inventory engine from router state.
pub trait InventoryHandlerState: Clone + Send + Sync + 'static {
    fn inventory_service(&self) -> &InventoryService;
}

/// Read and create routes, open to ADMIN and USER.
pub fn inventory_read_router<S>() -> Router<S>
where
    S: InventoryHandlerState,
{
    Router::new()
        .route("/inventory/all", get(get_all_inventories::<S>))
        .route("/inventory/filter", get(get_inventory_by_filters::<S>))
        .route("/inventory/{id}", get(get_inventory_by_id::<S>))
        .route("/inventory", post(create_inventory::<S>))
        .route("/inventory/details", post(create_inventory_details::<S>))
}

/// Update and delete routes, ADMIN only.
pub fn inventory_admin_router<S>() -> Router<S>
where
    S: InventoryHandlerState,
{
    Router::new()
        .route(
            "/inventory/{id}",
            put(update_inventory::<S>).delete(delete_inventory::<S>),
        )
        .route(
            "/inventory/details/{id}",
            put(update_inventory_detail::<S>).delete(delete_inventory_detail::<S>),
        )
}

/// List every product with its transactions
#[utoipa::path(
    get,
    path = "/inventory/all",
    responses(
        (status = 200, description = "All products", body = [InventoryMaster]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("basic_auth" = []), ("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn get_all_inventories<S>(
    State(state): State<S>,
) -> Result<Json<Vec<InventoryMaster>>, ServiceError>
where
    S: InventoryHandlerState,
{
    let all = state.inventory_service().get_all_inventories().await?;
    Ok(Json(all))
}

/// Get one product with its transactions
#[utoipa::path(
    get,
    path = "/inventory/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = InventoryMaster),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("basic_auth" = []), ("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn get_inventory_by_id<S>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> Result<Json<InventoryMaster>, ServiceError>
where
    S: InventoryHandlerState,
{
    let master = state.inventory_service().get_inventory_by_id(id).await?;
    Ok(Json(master))
}

/// Find products matching every supplied criterion
///
/// A product appears once per matching transaction. Products without
/// transactions never match.
#[utoipa::path(
    get,
    path = "/inventory/filter",
    params(InventoryFilterCriteria),
    responses(
        (status = 200, description = "Matching products", body = [InventoryMaster]),
        (status = 400, description = "Malformed query"),
        (status = 401, description = "Unauthorized")
    ),
    security(("basic_auth" = []), ("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn get_inventory_by_filters<S>(
    State(state): State<S>,
    Query(criteria): Query<InventoryFilterCriteria>,
) -> Result<Json<Vec<InventoryMaster>>, ServiceError>
where
    S: InventoryHandlerState,
{
    let found = state
        .inventory_service()
        .get_inventory_by_filters(criteria)
        .await?;
    Ok(Json(found))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/inventory",
    request_body = InventoryMasterDraft,
    responses(
        (status = 201, description = "Product created", body = InventoryMaster),
        (status = 400, description = "Invalid product", body = ErrorResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("basic_auth" = []), ("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn create_inventory<S>(
    State(state): State<S>,
    Json(draft): Json<InventoryMasterDraft>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    draft.validate()?;
    let created = state.inventory_service().create_inventory(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a product's fields
#[utoipa::path(
    put,
    path = "/inventory/{id}",
    params(("id" = i64, Path, description = "Product id")),
    request_body = InventoryMasterDraft,
    responses(
        (status = 200, description = "Product updated", body = InventoryMaster),
        (status = 400, description = "Invalid product", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "ADMIN role required"),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("basic_auth" = []), ("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn update_inventory<S>(
    State(state): State<S>,
    Path(id): Path<i64>,
    Json(draft): Json<InventoryMasterDraft>,
) -> Result<Json<InventoryMaster>, ServiceError>
where
    S: InventoryHandlerState,
{
    draft.validate()?;
    let updated = state.inventory_service().update_inventory(id, draft).await?;
    Ok(Json(updated))
}

/// Delete a product and all of its transactions
#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted or already absent"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "ADMIN role required")
    ),
    security(("basic_auth" = []), ("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn delete_inventory<S>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError>
where
    S: InventoryHandlerState,
{
    state.inventory_service().delete_inventory(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a transaction
#[utoipa::path(
    post,
    path = "/inventory/details",
    request_body = InventoryDetailsDraft,
    responses(
        (status = 201, description = "Transaction recorded", body = inventory_details::Model),
        (status = 400, description = "Invalid transaction", body = ErrorResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("basic_auth" = []), ("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn create_inventory_details<S>(
    State(state): State<S>,
    Json(draft): Json<InventoryDetailsDraft>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    draft.validate()?;
    let created = state
        .inventory_service()
        .create_inventory_details(draft)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a transaction's fields
#[utoipa::path(
    put,
    path = "/inventory/details/{id}",
    params(("id" = i64, Path, description = "Transaction id")),
    request_body = InventoryDetailsDraft,
    responses(
        (status = 200, description = "Transaction updated", body = inventory_details::Model),
        (status = 400, description = "Invalid transaction", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "ADMIN role required"),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    ),
    security(("basic_auth" = []), ("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn update_inventory_detail<S>(
    State(state): State<S>,
    Path(id): Path<i64>,
    Json(draft): Json<InventoryDetailsDraft>,
) -> Result<Json<inventory_details::Model>, ServiceError>
where
    S: InventoryHandlerState,
{
    draft.validate()?;
    let updated = state
        .inventory_service()
        .update_inventory_detail(id, draft)
        .await?;
    Ok(Json(updated))
}

/// Delete a transaction
#[utoipa::path(
    delete,
    path = "/inventory/details/{id}",
    params(("id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 204, description = "Transaction deleted or already absent"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "ADMIN role required")
    ),
    security(("basic_auth" = []), ("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn delete_inventory_detail<S>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError>
where
    S: InventoryHandlerState,
{
    state.inventory_service().delete_inventory_detail(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
