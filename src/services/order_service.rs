use std::str::FromStr;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    audit::log_audit,
    cart::{Cart, CartLine},
    dto::orders::{
        CheckoutRequest, OrderList, OrderReceipt, OrderWithItems, UpdateOrderStatusRequest,
    },
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Order, OrderItem, OrderStatus},
    payment,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Freeze a cart snapshot into a persisted order. The order and all of
/// its line items are written in one transaction; on any failure no
/// partial order exists.
pub async fn checkout(
    state: &AppState,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let customer_name = payload.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(AppError::Validation("customer name is required".into()));
    }
    if payload.items.is_empty() {
        return Err(AppError::Validation("cart is empty".into()));
    }

    // Fold the submitted lines through the cart so duplicate
    // (menu_id, variant) pairs merge exactly as they do client-side.
    let mut cart = Cart::detached();
    for line in &payload.items {
        if line.quantity <= 0 {
            return Err(AppError::Validation("quantity must be greater than 0".into()));
        }
        cart.add(CartLine {
            menu_id: line.menu_id,
            name: line.name.clone(),
            price: line.price,
            quantity: line.quantity,
            variant: line.variant.clone(),
            variant_price: line.variant_price,
        });
    }

    let total_amount = cart.total();
    if let Some(claimed) = payload.total_amount {
        if claimed != total_amount {
            return Err(AppError::Consistency(format!(
                "claimed total {claimed} does not match computed total {total_amount}"
            )));
        }
    }

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: NotSet,
        customer_name: Set(customer_name),
        total_amount: Set(total_amount),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::new();
    for line in cart.into_lines() {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            menu_id: Set(line.menu_id),
            name: Set(line.name.clone()),
            variant: Set(line.variant.clone()),
            quantity: Set(line.quantity),
            // price-at-purchase, variant modifier flattened in
            price: Set(line.unit_price()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total_amount": total_amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    tracing::info!(order_id = order.id, total_amount, "order created");

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Staff-only status overwrite. Any of the three statuses may be set
/// regardless of the current one; the permissiveness is deliberate.
pub async fn set_status(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = OrderStatus::from_str(&existing.status).map_err(AppError::Consistency)?;
    if current.is_terminal() && payload.status != current {
        tracing::info!(order_id = id, from = %current, to = %payload.status, "reopening terminal order");
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status.as_str().to_string());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

/// All orders, newest first. Every consumer relies on the descending
/// `created_at` ordering.
pub async fn list_orders(
    state: &AppState,
    status: Option<OrderStatus>,
) -> AppResult<ApiResponse<OrderList>> {
    let mut finder = Orders::find();
    if let Some(status) = status {
        finder = finder.filter(OrderCol::Status.eq(status.as_str()));
    }
    let orders = finder
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order = fetch_items_grouped(state, &order_ids).await?;

    let total = orders.len() as i64;
    let items = orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            Ok(OrderWithItems {
                order: order_from_entity(order)?,
                items,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::total_only(total)),
    ))
}

/// Receipt view: order, line items and the payment code for the total.
pub async fn get_order(state: &AppState, id: i32) -> AppResult<ApiResponse<OrderReceipt>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    let payment_code = payment::payment_code(order.id, order.total_amount);

    Ok(ApiResponse::success(
        "OK",
        OrderReceipt {
            order: order_from_entity(order)?,
            items,
            payment_code,
        },
        Some(Meta::empty()),
    ))
}

async fn fetch_items_grouped(
    state: &AppState,
    order_ids: &[i32],
) -> AppResult<std::collections::HashMap<i32, Vec<OrderItem>>> {
    let mut grouped: std::collections::HashMap<i32, Vec<OrderItem>> =
        std::collections::HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.to_vec()))
        .all(&state.orm)
        .await?;
    for row in rows {
        let item = order_item_from_entity(row);
        grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = OrderStatus::from_str(&model.status).map_err(AppError::Consistency)?;
    Ok(Order {
        id: model.id,
        customer_name: model.customer_name,
        total_amount: model.total_amount,
        status,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        menu_id: model.menu_id,
        name: model.name,
        variant: model.variant,
        quantity: model.quantity,
        price: model.price,
    }
}
