use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    audit::log_audit,
    dto::menu::{CreateMenuRequest, CreateVariantRequest, MenuList, MenuWithVariants, UpdateMenuRequest},
    entity::{
        menus::{ActiveModel as MenuActive, Column as MenuCol, Entity as Menus, Model as MenuModel},
        variants::{
            ActiveModel as VariantActive, Column as VariantCol, Entity as Variants,
            Model as VariantModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{MenuItem, Variant},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Public catalog: every item with its variants, ordered by category.
pub async fn list_menu(state: &AppState) -> AppResult<ApiResponse<MenuList>> {
    let rows = Menus::find()
        .find_with_related(Variants)
        .order_by_asc(MenuCol::Category)
        .all(&state.orm)
        .await?;

    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .map(|(menu, variants)| MenuWithVariants {
            item: menu_from_entity(menu),
            variants: variants.into_iter().map(variant_from_entity).collect(),
        })
        .collect();

    Ok(ApiResponse::success(
        "Menu",
        MenuList { items },
        Some(Meta::total_only(total)),
    ))
}

pub async fn create_menu(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_staff(user)?;

    if payload.name.trim().is_empty() || payload.category.trim().is_empty() {
        return Err(AppError::Validation(
            "name, price, and category are required".into(),
        ));
    }
    if payload.price < 0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }

    let menu = MenuActive {
        id: NotSet,
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(payload.category),
        image: Set(payload.image),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "menu_create",
        Some("menus"),
        Some(serde_json::json!({ "menu_id": menu.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Menu item created",
        menu_from_entity(menu),
        Some(Meta::empty()),
    ))
}

/// Partial update: unspecified fields are left unchanged; a field set
/// to an empty string is applied as-is.
pub async fn update_menu(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateMenuRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_staff(user)?;

    let existing = Menus::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };

    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::Validation("price must not be negative".into()));
        }
    }

    let mut active: MenuActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    let menu = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "menu_update",
        Some("menus"),
        Some(serde_json::json!({ "menu_id": menu.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Menu item updated",
        menu_from_entity(menu),
        Some(Meta::empty()),
    ))
}

/// Deletes the item's variants first, then the item, in one
/// transaction. Historical order lines keep their snapshot name.
pub async fn delete_menu(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;

    let existing = Menus::find_by_id(id).one(&state.orm).await?;
    if existing.is_none() {
        return Err(AppError::NotFound);
    }

    let txn = state.orm.begin().await?;
    Variants::delete_many()
        .filter(VariantCol::MenuId.eq(id))
        .exec(&txn)
        .await?;
    Menus::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "menu_delete",
        Some("menus"),
        Some(serde_json::json!({ "menu_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Menu item deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn add_variant(
    state: &AppState,
    user: &AuthUser,
    menu_id: i32,
    payload: CreateVariantRequest,
) -> AppResult<ApiResponse<Variant>> {
    ensure_staff(user)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("variant name is required".into()));
    }

    let menu = Menus::find_by_id(menu_id).one(&state.orm).await?;
    if menu.is_none() {
        return Err(AppError::NotFound);
    }

    let variant = VariantActive {
        id: NotSet,
        menu_id: Set(menu_id),
        name: Set(payload.name),
        price_modifier: Set(payload.price_modifier),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "variant_create",
        Some("variants"),
        Some(serde_json::json!({ "menu_id": menu_id, "variant_id": variant.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Variant created",
        variant_from_entity(variant),
        Some(Meta::empty()),
    ))
}

pub async fn remove_variant(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;

    let result = Variants::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "variant_delete",
        Some("variants"),
        Some(serde_json::json!({ "variant_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Variant deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn menu_from_entity(model: MenuModel) -> MenuItem {
    MenuItem {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category: model.category,
        image: model.image,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn variant_from_entity(model: VariantModel) -> Variant {
    Variant {
        id: model.id,
        menu_id: model.menu_id,
        name: model.name,
        price_modifier: model.price_modifier,
    }
}
