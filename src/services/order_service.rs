use std::collections::HashMap;

use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    dto::{
        cart::CartView,
        orders::{CheckoutRequest, DeliveryMethod, OrderList, OrderWithItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::cart_service,
    state::AppState,
};

/// The GET side of checkout: current lines and total, or a message sending
/// the user back to the cart when it is empty.
pub async fn checkout_preview(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CartView>> {
    let items = cart_service::load_lines(&state.pool, user.user_id).await?;
    if items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }
    let total = cart_service::cart_total(&items);
    Ok(ApiResponse::success(
        "Checkout",
        CartView { items, total },
        Some(Meta::empty()),
    ))
}

#[derive(FromRow)]
struct CheckoutRow {
    book_id: Uuid,
    quantity: i32,
    price: i64,
}

/// Convert the cart into an order and its frozen line snapshot in one
/// transaction: all rows land or none do.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let method = DeliveryMethod::parse(payload.delivery_method.trim())
        .ok_or_else(|| AppError::BadRequest("Choose a delivery method".to_string()))?;

    let address = payload
        .address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    if method == DeliveryMethod::Courier && address.is_none() {
        return Err(AppError::BadRequest(
            "Courier delivery requires an address".to_string(),
        ));
    }
    let address = match method {
        DeliveryMethod::Courier => address,
        DeliveryMethod::Pickup => None,
    };

    let mut txn = state.pool.begin().await?;

    let rows = sqlx::query_as::<_, CheckoutRow>(
        r#"
        SELECT ci.book_id, ci.quantity, b.price
        FROM cart_items ci
        JOIN books b ON b.id = ci.book_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at
        FOR UPDATE
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&mut *txn)
    .await?;

    if rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (id, user_id, status, delivery_method, address)
        VALUES ($1, $2, 'Created', $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(method.as_str())
    .bind(address)
    .fetch_one(&mut *txn)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (id, order_id, book_id, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(row.book_id)
        .bind(row.quantity)
        .bind(row.price)
        .fetch_one(&mut *txn)
        .await?;
        items.push(item);
    }

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&mut *txn)
        .await?;

    txn.commit().await?;

    tracing::info!(user_id = %user.user_id, order_id = %order.id, lines = items.len(), "order placed");

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();

    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let all_items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = ANY($1) ORDER BY created_at",
    )
    .bind(&order_ids)
    .fetch_all(&state.pool)
    .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in all_items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    let items = orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(meta),
    ))
}
