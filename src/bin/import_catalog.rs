//! One-time catalog loader: ingests a JSON array of books into the
//! books/genres tables, deduplicating genres by name. Offline maintenance
//! tool, not part of the served API.

use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use bookstore_api::{config::AppConfig, db::create_pool};

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    title: String,
    author: String,
    /// Decimal currency in the source file; stored as minor units.
    price: f64,
    genre: String,
    year: Option<i32>,
    cover: Option<String>,
    description: Option<String>,
    #[serde(default)]
    rating: f64,
}

fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/books_catalog.json".to_string());

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let raw = tokio::fs::read_to_string(&path).await?;
    let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;

    let mut txn = pool.begin().await?;
    let mut genre_ids: HashMap<String, Uuid> = HashMap::new();

    for entry in &entries {
        let genre_id = match genre_ids.get(entry.genre.as_str()) {
            Some(id) => *id,
            None => {
                // Upsert keeps the id stable when the genre already exists.
                let (id,): (Uuid,) = sqlx::query_as(
                    r#"
                    INSERT INTO genres (id, name) VALUES ($1, $2)
                    ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                    RETURNING id
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(entry.genre.as_str())
                .fetch_one(&mut *txn)
                .await?;
                genre_ids.insert(entry.genre.clone(), id);
                id
            }
        };

        let book_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, price, cover, description, year, rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(book_id)
        .bind(entry.title.as_str())
        .bind(entry.author.as_str())
        .bind(to_minor_units(entry.price))
        .bind(entry.cover.as_deref())
        .bind(entry.description.as_deref())
        .bind(entry.year)
        .bind(entry.rating)
        .execute(&mut *txn)
        .await?;

        sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
            .bind(book_id)
            .bind(genre_id)
            .execute(&mut *txn)
            .await?;
    }

    txn.commit().await?;
    println!("Imported {} books, {} genres", entries.len(), genre_ids.len());
    Ok(())
}
