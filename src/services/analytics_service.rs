//! Read-side aggregates over the full order set. The computations are
//! pure functions over plain rows; the async wrappers only fetch. Full
//! scans are fine at this scale; revisit with rollup tables if volume
//! ever demands it.

use chrono::{Local, NaiveDate};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    dto::analytics::{AnalyticsResponse, AnalyticsSummary, PopularItem, RevenueBucket},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::Entity as Orders,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_owner},
    models::OrderStatus,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const REVENUE_WINDOW_DAYS: i64 = 7;
pub const POPULAR_ITEMS_LIMIT: usize = 5;

/// One order reduced to what analytics needs. `created_on` is the
/// local calendar date of creation.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub total_amount: i64,
    pub status: OrderStatus,
    pub created_on: NaiveDate,
}

/// One line item of a COMPLETED order.
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub menu_id: i32,
    pub name: String,
    pub quantity: i32,
    pub price: i64,
}

pub fn summarize(orders: &[OrderRow]) -> AnalyticsSummary {
    let total_revenue: i64 = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(|o| o.total_amount)
        .sum();
    let total_orders = orders.len() as i64;
    let completed_orders = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .count() as i64;
    let pending_orders = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Pending)
        .count() as i64;

    // 0 when nothing completed; never divide by zero.
    let average_order_value = if completed_orders > 0 {
        total_revenue as f64 / completed_orders as f64
    } else {
        0.0
    };

    AnalyticsSummary {
        total_revenue,
        total_orders,
        completed_orders,
        pending_orders,
        average_order_value,
    }
}

/// Exactly `window_days` day buckets ending on `today`, oldest first.
/// Only COMPLETED orders contribute. Labels use English month
/// abbreviations (`%-d %b`), not a localized calendar.
pub fn bucket_revenue(orders: &[OrderRow], today: NaiveDate, window_days: i64) -> Vec<RevenueBucket> {
    (0..window_days)
        .rev()
        .map(|offset| {
            let day = today - chrono::Duration::days(offset);
            let day_orders: Vec<&OrderRow> = orders
                .iter()
                .filter(|o| o.status == OrderStatus::Completed && o.created_on == day)
                .collect();
            RevenueBucket {
                date: day.format("%-d %b").to_string(),
                revenue: day_orders.iter().map(|o| o.total_amount).sum(),
                orders: day_orders.len() as i64,
            }
        })
        .collect()
}

/// Group line items by referenced menu id, sum quantities and revenue,
/// rank by quantity descending. The sort is stable, so true ties keep
/// first-seen order.
pub fn rank_popular(items: &[ItemRow], top_n: usize) -> Vec<PopularItem> {
    let mut ranked: Vec<PopularItem> = Vec::new();
    for item in items {
        let name = if item.name.is_empty() {
            "Unknown Item".to_string()
        } else {
            item.name.clone()
        };
        match ranked.iter_mut().find(|p| p.menu_id == item.menu_id) {
            Some(existing) => {
                existing.count += item.quantity as i64;
                existing.revenue += item.price * item.quantity as i64;
            }
            None => ranked.push(PopularItem {
                menu_id: item.menu_id,
                name,
                count: item.quantity as i64,
                revenue: item.price * item.quantity as i64,
            }),
        }
    }
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top_n);
    ranked
}

/// Owner dashboard payload: summary, 7-day revenue series, top sellers.
pub async fn analytics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AnalyticsResponse>> {
    ensure_owner(user)?;

    let orders = Orders::find().all(&state.orm).await?;

    let completed_ids: Vec<i32> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed.as_str())
        .map(|o| o.id)
        .collect();

    let item_rows: Vec<ItemRow> = if completed_ids.is_empty() {
        Vec::new()
    } else {
        OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(completed_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|item| ItemRow {
                menu_id: item.menu_id,
                name: item.name,
                quantity: item.quantity,
                price: item.price,
            })
            .collect()
    };

    let order_rows: Vec<OrderRow> = orders
        .into_iter()
        .map(|o| {
            let status = o
                .status
                .parse::<OrderStatus>()
                .map_err(crate::error::AppError::Consistency)?;
            Ok(OrderRow {
                total_amount: o.total_amount,
                status,
                created_on: o.created_at.with_timezone(&Local).date_naive(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let today = Local::now().date_naive();
    let resp = AnalyticsResponse {
        summary: summarize(&order_rows),
        revenue_by_day: bucket_revenue(&order_rows, today, REVENUE_WINDOW_DAYS),
        popular_items: rank_popular(&item_rows, POPULAR_ITEMS_LIMIT),
    };

    Ok(ApiResponse::success("Analytics", resp, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(total: i64, status: OrderStatus, created_on: NaiveDate) -> OrderRow {
        OrderRow {
            total_amount: total,
            status,
            created_on,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn summary_counts_by_status() {
        let today = day(2025, 8, 25);
        let orders = vec![
            order(10000, OrderStatus::Completed, today),
            order(20000, OrderStatus::Pending, today),
        ];

        let summary = summarize(&orders);
        assert_eq!(summary.total_revenue, 10000);
        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.completed_orders, 1);
        assert_eq!(summary.pending_orders, 1);
        assert_eq!(summary.average_order_value, 10000.0);
    }

    #[test]
    fn summary_average_is_zero_without_completed_orders() {
        let today = day(2025, 8, 25);
        let orders = vec![
            order(10000, OrderStatus::Pending, today),
            order(5000, OrderStatus::Cancelled, today),
        ];

        let summary = summarize(&orders);
        assert_eq!(summary.total_revenue, 0);
        assert_eq!(summary.average_order_value, 0.0);
    }

    #[test]
    fn summary_of_empty_set() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.average_order_value, 0.0);
    }

    #[test]
    fn bucket_revenue_yields_exactly_window_days_ascending() {
        let today = day(2025, 8, 25);
        let buckets = bucket_revenue(&[], today, 7);

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].date, "19 Aug");
        assert_eq!(buckets[6].date, "25 Aug");
        assert!(buckets.iter().all(|b| b.revenue == 0 && b.orders == 0));
    }

    #[test]
    fn bucket_revenue_sums_completed_orders_per_day() {
        let today = day(2025, 8, 25);
        let orders = vec![
            order(10000, OrderStatus::Completed, today),
            order(15000, OrderStatus::Completed, today),
            order(99999, OrderStatus::Pending, today),
            order(7000, OrderStatus::Completed, day(2025, 8, 23)),
            // outside the window
            order(5000, OrderStatus::Completed, day(2025, 8, 1)),
        ];

        let buckets = bucket_revenue(&orders, today, 7);
        assert_eq!(buckets[6].revenue, 25000);
        assert_eq!(buckets[6].orders, 2);
        assert_eq!(buckets[4].revenue, 7000);
        assert_eq!(buckets[4].orders, 1);
        assert_eq!(buckets.iter().map(|b| b.revenue).sum::<i64>(), 32000);
    }

    #[test]
    fn rank_popular_groups_by_menu_id_and_sorts_by_quantity() {
        let items = vec![
            ItemRow {
                menu_id: 1,
                name: "Ayam Goreng".into(),
                quantity: 2,
                price: 25000,
            },
            ItemRow {
                menu_id: 2,
                name: "Chicken Burger".into(),
                quantity: 5,
                price: 22000,
            },
            ItemRow {
                menu_id: 1,
                name: "Ayam Goreng".into(),
                quantity: 4,
                price: 27000,
            },
        ];

        let ranked = rank_popular(&items, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].menu_id, 1);
        assert_eq!(ranked[0].count, 6);
        assert_eq!(ranked[0].revenue, 2 * 25000 + 4 * 27000);
        assert_eq!(ranked[1].menu_id, 2);
    }

    #[test]
    fn rank_popular_truncates_and_breaks_ties_by_first_seen() {
        let items: Vec<ItemRow> = (1..=4)
            .map(|id| ItemRow {
                menu_id: id,
                name: format!("Item {id}"),
                quantity: 3,
                price: 1000,
            })
            .collect();

        let ranked = rank_popular(&items, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].menu_id, 1);
        assert_eq!(ranked[1].menu_id, 2);
    }

    #[test]
    fn rank_popular_falls_back_for_unnamed_items() {
        let items = vec![ItemRow {
            menu_id: 9,
            name: String::new(),
            quantity: 1,
            price: 1000,
        }];

        let ranked = rank_popular(&items, 5);
        assert_eq!(ranked[0].name, "Unknown Item");
    }
}
