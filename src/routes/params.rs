use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    /// Optional status filter: PENDING, COMPLETED or CANCELLED.
    pub status: Option<String>,
}
