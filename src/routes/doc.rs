use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        analytics::{AnalyticsResponse, AnalyticsSummary, PopularItem, RevenueBucket},
        auth::{LoginRequest, LoginResponse, SessionResponse},
        discounts::{CreateDiscountRequest, DiscountList, DiscountView},
        menu::{CreateMenuRequest, CreateVariantRequest, MenuList, MenuWithVariants, UpdateMenuRequest},
        orders::{
            CheckoutLine, CheckoutRequest, OrderList, OrderReceipt, OrderWithItems,
            UpdateOrderStatusRequest,
        },
    },
    models::{Discount, MenuItem, Order, OrderItem, OrderStatus, Role, Variant},
    response::{ApiResponse, Meta},
    routes::{auth, discounts, health, menu, orders, owner, params, staff},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("Opaque")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::logout,
        auth::session,
        menu::list_menu,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        staff::create_menu,
        staff::update_menu,
        staff::delete_menu,
        staff::add_variant,
        staff::remove_variant,
        staff::update_order_status,
        discounts::list_discounts,
        discounts::create_discount,
        discounts::delete_discount,
        owner::analytics,
        owner::export
    ),
    components(
        schemas(
            MenuItem,
            Variant,
            Order,
            OrderItem,
            OrderStatus,
            Discount,
            Role,
            LoginRequest,
            LoginResponse,
            SessionResponse,
            CreateMenuRequest,
            UpdateMenuRequest,
            CreateVariantRequest,
            MenuWithVariants,
            MenuList,
            CheckoutLine,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderReceipt,
            OrderList,
            CreateDiscountRequest,
            DiscountView,
            DiscountList,
            AnalyticsSummary,
            RevenueBucket,
            PopularItem,
            AnalyticsResponse,
            params::OrderListQuery,
            Meta,
            ApiResponse<MenuList>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderReceipt>,
            ApiResponse<AnalyticsResponse>,
            ApiResponse<DiscountList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Session endpoints"),
        (name = "Menu", description = "Public catalog"),
        (name = "Orders", description = "Checkout and order tracking"),
        (name = "Staff", description = "Catalog and order management"),
        (name = "Discounts", description = "Promotional discounts"),
        (name = "Owner", description = "Analytics and export"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
