use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::{
    audit::log_audit,
    dto::discounts::{CreateDiscountRequest, DiscountList, DiscountView},
    entity::discounts::{
        ActiveModel as DiscountActive, Column as DiscountCol, Entity as Discounts,
        Model as DiscountModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Discount,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Public promotional listing, newest first. Discounts are display
/// only; they are never applied to order totals.
pub async fn list_discounts(state: &AppState) -> AppResult<ApiResponse<DiscountList>> {
    let now = Utc::now();
    let items: Vec<DiscountView> = Discounts::find()
        .order_by_desc(DiscountCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| {
            let discount = discount_from_entity(model);
            let active = discount.active(now);
            DiscountView { discount, active }
        })
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Discounts",
        DiscountList { items },
        Some(Meta::total_only(total)),
    ))
}

pub async fn create_discount(
    state: &AppState,
    user: &AuthUser,
    payload: CreateDiscountRequest,
) -> AppResult<ApiResponse<Discount>> {
    ensure_staff(user)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    if !(1..=100).contains(&payload.percentage) {
        return Err(AppError::Validation(
            "percentage must be between 1 and 100".into(),
        ));
    }
    if payload.end_date < payload.start_date {
        return Err(AppError::Validation(
            "end date must not be before start date".into(),
        ));
    }

    let discount = DiscountActive {
        id: NotSet,
        name: Set(payload.name),
        percentage: Set(payload.percentage),
        start_date: Set(payload.start_date.into()),
        end_date: Set(payload.end_date.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "discount_create",
        Some("discounts"),
        Some(serde_json::json!({ "discount_id": discount.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Discount created",
        discount_from_entity(discount),
        Some(Meta::empty()),
    ))
}

pub async fn delete_discount(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;

    let result = Discounts::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "discount_delete",
        Some("discounts"),
        Some(serde_json::json!({ "discount_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Discount deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn discount_from_entity(model: DiscountModel) -> Discount {
    Discount {
        id: model.id,
        name: model.name,
        percentage: model.percentage,
        start_date: model.start_date.with_timezone(&Utc),
        end_date: model.end_date.with_timezone(&Utc),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
