use axum::{Router, routing::get};

use crate::state::AppState;

pub mod auth;
pub mod books;
pub mod cart;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/home", get(catalog::home))
        .nest("/auth", auth::router())
        .nest("/catalog", catalog::router())
        .nest("/books", books::router())
        .nest("/cart", cart::router())
        .nest("/checkout", orders::checkout_router())
        .nest("/orders", orders::router())
}
