use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{CartLine, CartView, UpdateCartRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Book, CartItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct CartLineRow {
    cart_id: Uuid,
    quantity: i32,
    book_id: Uuid,
    title: String,
    author: String,
    price: i64,
    cover: Option<String>,
    description: Option<String>,
    year: Option<i32>,
    rating: f64,
    rating_count: i32,
    created_at: DateTime<Utc>,
}

/// Load the user's cart lines joined with their books, oldest first.
pub async fn load_lines(pool: &DbPool, user_id: Uuid) -> AppResult<Vec<CartLine>> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               b.id AS book_id, b.title, b.author, b.price, b.cover, b.description,
               b.year, b.rating, b.rating_count, b.created_at
        FROM cart_items ci
        JOIN books b ON b.id = ci.book_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let lines = rows
        .into_iter()
        .map(|row| CartLine {
            id: row.cart_id,
            book: Book {
                id: row.book_id,
                title: row.title,
                author: row.author,
                price: row.price,
                cover: row.cover,
                description: row.description,
                year: row.year,
                rating: row.rating,
                rating_count: row.rating_count,
                created_at: row.created_at,
            },
            quantity: row.quantity,
        })
        .collect();

    Ok(lines)
}

pub fn cart_total(lines: &[CartLine]) -> i64 {
    lines
        .iter()
        .map(|line| line.book.price * i64::from(line.quantity))
        .sum()
}

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let items = load_lines(&state.pool, user.user_id).await?;
    let total = cart_total(&items);
    Ok(ApiResponse::success(
        "Cart",
        CartView { items, total },
        Some(Meta::empty()),
    ))
}

/// First add creates the line at quantity 1; every repeat add bumps it by one.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    book_id: Uuid,
) -> AppResult<ApiResponse<CartItem>> {
    let book_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM books WHERE id = $1")
        .bind(book_id)
        .fetch_optional(&state.pool)
        .await?;
    if book_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let cart_item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (id, user_id, book_id, quantity)
        VALUES ($1, $2, $3, 1)
        ON CONFLICT (user_id, book_id)
        DO UPDATE SET quantity = cart_items.quantity + 1
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(book_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success("Book added to cart", cart_item, None))
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let item = find_item(state, item_id, user).await?;

    let cart_item = sqlx::query_as::<_, CartItem>(
        "UPDATE cart_items SET quantity = $2 WHERE id = $1 RETURNING *",
    )
    .bind(item.id)
    .bind(payload.quantity)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success("Cart updated", cart_item, None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let item = find_item(state, item_id, user).await?;

    sqlx::query("DELETE FROM cart_items WHERE id = $1")
        .bind(item.id)
        .execute(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Look up a cart line by id and make sure it belongs to the caller.
/// Another user's line is a Forbidden, not a silent miss.
async fn find_item(state: &AppState, item_id: Uuid, user: &AuthUser) -> AppResult<CartItem> {
    let item: Option<CartItem> = sqlx::query_as("SELECT * FROM cart_items WHERE id = $1")
        .bind(item_id)
        .fetch_optional(&state.pool)
        .await?;
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };
    if item.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(item)
}
