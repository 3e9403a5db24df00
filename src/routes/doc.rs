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
        auth::{LoginRequest, RegisterRequest, RegisterResponse, SessionResponse, VerifyRequest},
        cart::{CartLine, CartView, UpdateCartRequest},
        catalog::{BookDetail, CatalogPage, HomePage},
        orders::{CheckoutRequest, OrderList, OrderWithItems},
        reviews::{ReviewRequest, ReviewSubmitted, ReviewView},
    },
    models::{Book, CartItem, Genre, Order, OrderItem, Review, User},
    response::{ApiResponse, Meta},
    routes::{auth, books, cart, catalog, health, orders, params},
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
                    .bearer_format("Session token")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::verify,
        auth::login,
        auth::logout_confirm,
        auth::logout,
        catalog::home,
        catalog::catalog,
        books::book_detail,
        books::submit_review,
        cart::cart_view,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        orders::checkout_preview,
        orders::checkout,
        orders::list_orders,
    ),
    components(
        schemas(
            User,
            Genre,
            Book,
            CartItem,
            Order,
            OrderItem,
            Review,
            RegisterRequest,
            RegisterResponse,
            VerifyRequest,
            LoginRequest,
            SessionResponse,
            HomePage,
            CatalogPage,
            BookDetail,
            ReviewRequest,
            ReviewView,
            ReviewSubmitted,
            UpdateCartRequest,
            CartLine,
            CartView,
            CheckoutRequest,
            OrderWithItems,
            OrderList,
            params::Pagination,
            params::CatalogQuery,
            Meta,
            ApiResponse<HomePage>,
            ApiResponse<CatalogPage>,
            ApiResponse<BookDetail>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<SessionResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, verification, login, logout"),
        (name = "Catalog", description = "Browsing and search"),
        (name = "Reviews", description = "Book reviews and rating"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
