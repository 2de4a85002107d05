use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    routing::get,
};
use chrono::Utc;

use crate::{
    dto::analytics::AnalyticsResponse,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{analytics_service, export_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(analytics))
        .route("/export", get(export))
}

#[utoipa::path(
    get,
    path = "/api/owner/analytics",
    responses(
        (status = 200, description = "Sales summary, revenue by day, and top sellers", body = ApiResponse<AnalyticsResponse>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AnalyticsResponse>>> {
    let resp = analytics_service::analytics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/export",
    responses(
        (status = 200, description = "Completed orders as CSV", content_type = "text/csv"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn export(State(state): State<AppState>, user: AuthUser) -> AppResult<(HeaderMap, String)> {
    let csv = export_service::sales_report(&state, &user).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    let disposition = format!(
        "attachment; filename=\"sales-report-{}.csv\"",
        Utc::now().timestamp_millis()
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, csv))
}
