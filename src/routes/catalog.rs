use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CatalogPage, HomePage},
    error::AppResult,
    response::ApiResponse,
    routes::params::{CatalogQuery, HomeQuery},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(catalog))
}

#[utoipa::path(
    get,
    path = "/api/home",
    params(
        ("q" = Option<String>, Query, description = "Free-text search over title and author")
    ),
    responses(
        (status = 200, description = "Homepage: genres, top 3 books, optional search results", body = ApiResponse<HomePage>)
    ),
    tag = "Catalog"
)]
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> AppResult<Json<ApiResponse<HomePage>>> {
    let resp = catalog_service::home(&state, query.q).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog",
    params(
        ("q" = Option<String>, Query, description = "Free-text search over title and author"),
        ("genre" = Option<Uuid>, Query, description = "Restrict to one genre id"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Book listing ordered by title", body = ApiResponse<CatalogPage>)
    ),
    tag = "Catalog"
)]
pub async fn catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<CatalogPage>>> {
    let resp = catalog_service::catalog(&state, query).await?;
    Ok(Json(resp))
}
