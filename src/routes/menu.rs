use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::menu::MenuList, error::AppResult, response::ApiResponse, services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_menu))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    responses(
        (status = 200, description = "List menu items with variants, grouped by category", body = ApiResponse<MenuList>)
    ),
    tag = "Menu"
)]
pub async fn list_menu(State(state): State<AppState>) -> AppResult<Json<ApiResponse<MenuList>>> {
    let resp = menu_service::list_menu(&state).await?;
    Ok(Json(resp))
}
