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
    cart::{CartExtra, CartLine, CartState},
    dto::{
        cart::{
            AddToCartRequest, AddToCartResponse, CartView, CheckoutRequest, SelectedExtraRequest,
            UpdateQuantityRequest,
        },
        menu::{CategoryList, ExtraList, MenuItemList, MenuStats, PriceRange},
        orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    },
    models::{Category, Extra, MenuItem, Order, OrderItem, OrderItemExtra, OrderStatus, OrderType},
    response::{ApiResponse, Meta},
    routes::{cart, health, menu, orders, params, staff},
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
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        menu::list_categories,
        menu::list_menu_items,
        menu::menu_stats,
        menu::get_menu_item,
        menu::list_extras,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::checkout,
        orders::create_order,
        orders::get_order,
        orders::get_order_by_number,
        staff::list_orders,
        staff::update_order_status
    ),
    components(
        schemas(
            Category,
            MenuItem,
            Extra,
            CartExtra,
            CartLine,
            CartState,
            CartView,
            Order,
            OrderItem,
            OrderItemExtra,
            OrderStatus,
            OrderType,
            AddToCartRequest,
            AddToCartResponse,
            SelectedExtraRequest,
            UpdateQuantityRequest,
            CheckoutRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            CategoryList,
            MenuItemList,
            ExtraList,
            MenuStats,
            PriceRange,
            OrderList,
            OrderWithItems,
            params::Pagination,
            params::MenuQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<MenuItemList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Menu", description = "Categories, menu items and extras"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order creation and confirmation lookup"),
        (name = "Staff", description = "Order lifecycle for restaurant staff"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
