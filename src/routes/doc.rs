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
        cart::{
            AddToCartRequest, CartItemView, CartView, CategoryView, ProductImageView, ProductView,
            UpdateCartItemRequest,
        },
        catalog::{
            CategoryList, CreateCategoryRequest, CreateProductRequest, ProductList,
            UpdateCategoryRequest, UpdateProductRequest,
        },
        inventory::{InventoryAdjustRequest, StockView},
        orders::{OrderItemView, OrderList, OrderView, UpdateOrderStatusRequest},
    },
    entity::{cart_items::CartItemStatus, orders::OrderStatus},
    response::{ApiResponse, Meta},
    routes::{admin, cart, catalog, health, orders, params},
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
        catalog::list_categories,
        catalog::create_category,
        catalog::update_category,
        catalog::delete_category,
        catalog::list_products,
        catalog::get_product,
        catalog::create_product,
        catalog::update_product,
        catalog::delete_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        admin::update_order_status,
        admin::adjust_inventory
    ),
    components(
        schemas(
            CartView,
            CartItemView,
            ProductView,
            CategoryView,
            ProductImageView,
            CartItemStatus,
            CategoryList,
            ProductList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateProductRequest,
            UpdateProductRequest,
            AddToCartRequest,
            UpdateCartItemRequest,
            OrderView,
            OrderItemView,
            OrderList,
            OrderStatus,
            UpdateOrderStatusRequest,
            InventoryAdjustRequest,
            StockView,
            health::HealthData,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<ProductView>,
            ApiResponse<ProductList>,
            ApiResponse<OrderView>,
            ApiResponse<OrderList>,
            ApiResponse<StockView>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Category and product endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Admin", description = "Inventory and order lifecycle endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
