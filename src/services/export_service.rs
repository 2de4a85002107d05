use chrono::{Local, NaiveDate};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_owner},
    models::OrderStatus,
    state::AppState,
};

pub const CSV_HEADER: &str = "Order ID,Customer Name,Date,Total Amount,Items";

/// One completed order flattened for the report.
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub order_id: i32,
    pub customer_name: String,
    pub date: NaiveDate,
    pub total_amount: i64,
    /// (name, quantity) per line item.
    pub items: Vec<(String, i32)>,
}

/// Render rows as CSV in input order; the caller pre-filters to
/// COMPLETED orders. The items column is quoted because the joined
/// list contains commas in names; the customer name column is left
/// unquoted, matching the legacy report format (a known escaping gap).
/// Dates render as zero-padded `%d/%m/%Y` regardless of locale.
pub fn render_csv(rows: &[ExportRow]) -> String {
    let mut out = vec![CSV_HEADER.to_string()];
    for row in rows {
        let items = row
            .items
            .iter()
            .map(|(name, quantity)| format!("{name} ({quantity}x)"))
            .collect::<Vec<_>>()
            .join("; ");
        out.push(format!(
            "{},{},{},{},\"{}\"",
            row.order_id,
            row.customer_name,
            row.date.format("%d/%m/%Y"),
            row.total_amount,
            items,
        ));
    }
    out.join("\n")
}

/// Completed orders, newest first, as CSV text.
pub async fn sales_report(state: &AppState, user: &AuthUser) -> AppResult<String> {
    ensure_owner(user)?;

    let orders = Orders::find()
        .filter(OrderCol::Status.eq(OrderStatus::Completed.as_str()))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: std::collections::HashMap<i32, Vec<(String, i32)>> =
        std::collections::HashMap::new();
    if !order_ids.is_empty() {
        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(order_ids))
            .all(&state.orm)
            .await?;
        for item in items {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push((item.name, item.quantity));
        }
    }

    let rows: Vec<ExportRow> = orders
        .into_iter()
        .map(|order| ExportRow {
            order_id: order.id,
            customer_name: order.customer_name.clone(),
            date: order.created_at.with_timezone(&Local).date_naive(),
            total_amount: order.total_amount,
            items: items_by_order.remove(&order.id).unwrap_or_default(),
        })
        .collect();

    Ok(render_csv(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn header_only_for_empty_input() {
        assert_eq!(render_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn renders_one_row_per_order_in_input_order() {
        let rows = vec![
            ExportRow {
                order_id: 2,
                customer_name: "Budi".into(),
                date: date(2025, 8, 25),
                total_amount: 30000,
                items: vec![("Ayam Bakar".into(), 1)],
            },
            ExportRow {
                order_id: 1,
                customer_name: "Sari".into(),
                date: date(2025, 8, 24),
                total_amount: 54000,
                items: vec![("Ayam Goreng Crispy".into(), 2)],
            },
        ];

        let csv = render_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "2,Budi,25/08/2025,30000,\"Ayam Bakar (1x)\"");
        assert_eq!(
            lines[2],
            "1,Sari,24/08/2025,54000,\"Ayam Goreng Crispy (2x)\""
        );
    }

    #[test]
    fn items_are_semicolon_joined_and_quoted() {
        let rows = vec![ExportRow {
            order_id: 1,
            customer_name: "A".into(),
            date: date(2025, 8, 25),
            total_amount: 5000,
            items: vec![("Nasi, Ayam".into(), 2), ("Teh".into(), 1)],
        }];

        let csv = render_csv(&rows);
        assert!(csv.contains("\"Nasi, Ayam (2x); Teh (1x)\""));
    }

    #[test]
    fn customer_name_with_comma_is_not_escaped() {
        // The reference format only quotes the items column.
        let rows = vec![ExportRow {
            order_id: 1,
            customer_name: "A,B".into(),
            date: date(2025, 8, 25),
            total_amount: 5000,
            items: vec![("X".into(), 2)],
        }];

        let csv = render_csv(&rows);
        assert!(csv.contains("1,A,B,25/08/2025,5000,\"X (2x)\""));
    }
}
