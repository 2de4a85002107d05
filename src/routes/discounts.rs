use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};

use crate::{
    dto::discounts::{CreateDiscountRequest, DiscountList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Discount,
    response::ApiResponse,
    services::discount_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_discounts).post(create_discount))
        .route("/{id}", delete(delete_discount))
}

// The listing is public so the storefront can show running promotions.
#[utoipa::path(
    get,
    path = "/api/staff/discounts",
    responses(
        (status = 200, description = "List discounts, newest first", body = ApiResponse<DiscountList>)
    ),
    tag = "Discounts"
)]
pub async fn list_discounts(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<DiscountList>>> {
    let resp = discount_service::list_discounts(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/staff/discounts",
    request_body = CreateDiscountRequest,
    responses(
        (status = 200, description = "Create discount", body = ApiResponse<Discount>),
        (status = 400, description = "Invalid percentage or date window"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn create_discount(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateDiscountRequest>,
) -> AppResult<Json<ApiResponse<Discount>>> {
    let resp = discount_service::create_discount(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/staff/discounts/{id}",
    params(
        ("id" = i32, Path, description = "Discount ID")
    ),
    responses(
        (status = 200, description = "Delete discount", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn delete_discount(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = discount_service::delete_discount(&state, &user, id).await?;
    Ok(Json(resp))
}
