use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod discounts;
pub mod doc;
pub mod health;
pub mod menu;
pub mod orders;
pub mod owner;
pub mod params;
pub mod staff;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/menu", menu::router())
        .nest("/orders", orders::router())
        .nest("/staff", staff::router())
        .nest("/owner", owner::router())
}
