use uuid::Uuid;

use crate::{
    dto::{
        catalog::BookDetail,
        reviews::{ReviewRequest, ReviewSubmitted, ReviewView},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Book, Review},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_book(state: &AppState, id: Uuid) -> AppResult<ApiResponse<BookDetail>> {
    let book: Option<Book> = sqlx::query_as("SELECT * FROM books WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let book = match book {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    let reviews = sqlx::query_as::<_, ReviewView>(
        r#"
        SELECT r.id, r.user_id, u.name AS user_name, r.rating, r.text, r.created_at
        FROM reviews r
        JOIN users u ON u.id = r.user_id
        WHERE r.book_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(book.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Book",
        BookDetail { book, reviews },
        None,
    ))
}

/// Upsert the caller's review for a book and recompute the book's
/// denormalized rating inside the same transaction.
pub async fn submit_review(
    state: &AppState,
    user: &AuthUser,
    book_id: Uuid,
    payload: ReviewRequest,
) -> AppResult<ApiResponse<ReviewSubmitted>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    let text = payload.text.unwrap_or_default().trim().to_string();

    let book_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM books WHERE id = $1")
        .bind(book_id)
        .fetch_optional(&state.pool)
        .await?;
    if book_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let mut txn = state.pool.begin().await?;

    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (id, user_id, book_id, rating, text, created_at)
        VALUES ($1, $2, $3, $4, $5, now())
        ON CONFLICT (user_id, book_id)
        DO UPDATE SET rating = EXCLUDED.rating, text = EXCLUDED.text, created_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(book_id)
    .bind(payload.rating)
    .bind(text)
    .fetch_one(&mut *txn)
    .await?;

    let book = sqlx::query_as::<_, Book>(
        r#"
        UPDATE books
        SET rating = COALESCE((SELECT AVG(rating)::double precision FROM reviews WHERE book_id = $1), 0),
            rating_count = (SELECT COUNT(*) FROM reviews WHERE book_id = $1)::int
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(book_id)
    .fetch_one(&mut *txn)
    .await?;

    txn.commit().await?;

    tracing::info!(user_id = %user.user_id, %book_id, rating = review.rating, "review saved");

    Ok(ApiResponse::success(
        "Review saved",
        ReviewSubmitted { review, book },
        Some(Meta::empty()),
    ))
}
