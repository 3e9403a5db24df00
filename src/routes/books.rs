use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        catalog::BookDetail,
        reviews::{ReviewRequest, ReviewSubmitted},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::book_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(book_detail))
        .route("/{id}/reviews", post(submit_review))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book with its reviews, newest first", body = ApiResponse<BookDetail>),
        (status = 404, description = "Book not found"),
    ),
    tag = "Catalog"
)]
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookDetail>>> {
    let resp = book_service::get_book(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review upserted, book rating recomputed", body = ApiResponse<ReviewSubmitted>),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Book not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn submit_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> AppResult<Json<ApiResponse<ReviewSubmitted>>> {
    let resp = book_service::submit_review(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
