use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_revenue: i64,
    pub total_orders: i64,
    pub completed_orders: i64,
    pub pending_orders: i64,
    pub average_order_value: f64,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct RevenueBucket {
    /// Human-readable day label, e.g. "25 Aug".
    pub date: String,
    pub revenue: i64,
    pub orders: i64,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    pub menu_id: i32,
    pub name: String,
    pub count: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub summary: AnalyticsSummary,
    pub revenue_by_day: Vec<RevenueBucket>,
    pub popular_items: Vec<PopularItem>,
}
