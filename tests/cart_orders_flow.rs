use std::time::Duration;

use bookstore_api::{
    db::create_pool,
    dto::{cart::UpdateCartRequest, orders::CheckoutRequest},
    error::AppError,
    middleware::auth::AuthUser,
    services::{cart_service, order_service},
    session::SessionStore,
    state::AppState,
};
use uuid::Uuid;

// Adding the same book twice must merge into one line with quantity 2.
#[tokio::test]
async fn repeat_add_increments_single_line() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let book_id = seed_book(&state, 1500).await?;

    cart_service::add_to_cart(&state, &user, book_id).await?;
    let second = cart_service::add_to_cart(&state, &user, book_id)
        .await?
        .data
        .unwrap();
    assert_eq!(second.quantity, 2);

    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1 AND book_id = $2")
            .bind(user.user_id)
            .bind(book_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(count.0, 1);

    Ok(())
}

#[tokio::test]
async fn cart_mutations_are_scoped_to_the_owner() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state).await?;
    let intruder = create_user(&state).await?;
    let book_id = seed_book(&state, 900).await?;

    let item = cart_service::add_to_cart(&state, &owner, book_id)
        .await?
        .data
        .unwrap();

    let err = cart_service::update_quantity(
        &state,
        &intruder,
        item.id,
        UpdateCartRequest { quantity: 5 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = cart_service::remove_from_cart(&state, &intruder, item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Untouched.
    let quantity: (i32,) = sqlx::query_as("SELECT quantity FROM cart_items WHERE id = $1")
        .bind(item.id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(quantity.0, 1);

    // The owner can still do both.
    let updated = cart_service::update_quantity(
        &state,
        &owner,
        item.id,
        UpdateCartRequest { quantity: 3 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.quantity, 3);

    let err = cart_service::update_quantity(
        &state,
        &owner,
        item.id,
        UpdateCartRequest { quantity: 0 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    cart_service::remove_from_cart(&state, &owner, item.id).await?;

    Ok(())
}

#[tokio::test]
async fn checkout_freezes_prices_and_empties_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let first = seed_book(&state, 1000).await?;
    let second = seed_book(&state, 2500).await?;

    cart_service::add_to_cart(&state, &user, first).await?;
    cart_service::add_to_cart(&state, &user, first).await?;
    cart_service::add_to_cart(&state, &user, second).await?;

    // Reprice one book before checkout: the order must snapshot the price
    // current at purchase time.
    sqlx::query("UPDATE books SET price = $2 WHERE id = $1")
        .bind(first)
        .bind(1200_i64)
        .execute(&state.pool)
        .await?;

    let placed = order_service::checkout(
        &state,
        &user,
        CheckoutRequest {
            delivery_method: "pickup".into(),
            address: None,
        },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(placed.order.status, "Created");
    assert_eq!(placed.order.delivery_method, "pickup");
    assert_eq!(placed.order.address, None);
    assert_eq!(placed.items.len(), 2);

    let frozen_first = placed
        .items
        .iter()
        .find(|i| i.book_id == first)
        .expect("line for first book");
    assert_eq!(frozen_first.quantity, 2);
    assert_eq!(frozen_first.price, 1200);

    // Later repricing must not touch the snapshot.
    sqlx::query("UPDATE books SET price = 9999 WHERE id = $1")
        .bind(first)
        .execute(&state.pool)
        .await?;
    let stored: (i64,) = sqlx::query_as("SELECT price FROM order_items WHERE id = $1")
        .bind(frozen_first.id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(stored.0, 1200);

    // Cart is gone.
    let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(remaining.0, 0);

    let orders = order_service::list_orders(
        &state,
        &user,
        bookstore_api::routes::params::Pagination {
            page: None,
            per_page: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(orders.items.len(), 1);
    assert_eq!(orders.items[0].items.len(), 2);

    Ok(())
}

#[tokio::test]
async fn courier_checkout_requires_address_and_writes_nothing_on_failure() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let book_id = seed_book(&state, 700).await?;
    cart_service::add_to_cart(&state, &user, book_id).await?;

    let err = order_service::checkout(
        &state,
        &user,
        CheckoutRequest {
            delivery_method: "courier".into(),
            address: Some("   ".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::checkout(
        &state,
        &user,
        CheckoutRequest {
            delivery_method: "drone".into(),
            address: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Failed attempts left the cart intact and created no order rows.
    let cart: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(cart.0, 1);
    let orders: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(orders.0, 0);

    // With an address the courier order goes through and keeps it.
    let placed = order_service::checkout(
        &state,
        &user,
        CheckoutRequest {
            delivery_method: "courier".into(),
            address: Some("12 Example St".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(placed.order.address.as_deref(), Some("12 Example St"));

    Ok(())
}

#[tokio::test]
async fn checkout_with_empty_cart_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;

    let err = order_service::checkout(
        &state,
        &user,
        CheckoutRequest {
            delivery_method: "pickup".into(),
            address: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::checkout_preview(&state, &user).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(Some(AppState {
        pool,
        sessions: SessionStore::new(Duration::from_secs(900)),
    }))
}

async fn create_user(state: &AppState) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, phone, password_hash) VALUES ($1, $2, $3, $4, 'dummy')",
    )
    .bind(id)
    .bind("Test User")
    .bind(format!("user-{id}@example.com"))
    .bind("+70000000000")
    .execute(&state.pool)
    .await?;

    let token = state.sessions.create_session(id);
    Ok(AuthUser { user_id: id, token })
}

async fn seed_book(state: &AppState, price: i64) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO books (id, title, author, price) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(format!("Test Book {id}"))
        .bind("Test Author")
        .bind(price)
        .execute(&state.pool)
        .await?;
    Ok(id)
}
