use crate::{
    dto::catalog::{CatalogPage, HomePage},
    error::AppResult,
    models::{Book, Genre},
    response::{ApiResponse, Meta},
    routes::params::CatalogQuery,
    state::AppState,
};

/// Case-insensitive substring match over title and author, applied to the
/// already-materialized listing rather than pushed into SQL.
///
/// Uses Unicode simple lowercasing, not full case folding: "ß" stays "ß"
/// and will not match a query spelled "ss".
fn matches_query(book: &Book, needle: &str) -> bool {
    book.title.to_lowercase().contains(needle) || book.author.to_lowercase().contains(needle)
}

fn normalized(q: Option<&String>) -> Option<String> {
    q.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}

async fn list_genres(state: &AppState) -> AppResult<Vec<Genre>> {
    let genres = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(genres)
}

pub async fn home(state: &AppState, q: Option<String>) -> AppResult<ApiResponse<HomePage>> {
    let genres = list_genres(state).await?;

    let top_books = sqlx::query_as::<_, Book>(
        "SELECT * FROM books ORDER BY rating DESC, rating_count DESC LIMIT 3",
    )
    .fetch_all(&state.pool)
    .await?;

    let search_results = match normalized(q.as_ref()) {
        Some(needle) => {
            let all = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
                .fetch_all(&state.pool)
                .await?;
            all.into_iter()
                .filter(|book| matches_query(book, &needle))
                .collect()
        }
        None => Vec::new(),
    };

    Ok(ApiResponse::success(
        "OK",
        HomePage {
            genres,
            top_books,
            search_results,
        },
        Some(Meta::empty()),
    ))
}

pub async fn catalog(
    state: &AppState,
    query: CatalogQuery,
) -> AppResult<ApiResponse<CatalogPage>> {
    let (page, limit, offset) = query.pagination().normalize();
    let genres = list_genres(state).await?;

    let books = match query.genre {
        Some(genre_id) => {
            sqlx::query_as::<_, Book>(
                r#"
                SELECT b.*
                FROM books b
                JOIN book_genres bg ON bg.book_id = b.id
                WHERE bg.genre_id = $1
                ORDER BY b.title
                "#,
            )
            .bind(genre_id)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
                .fetch_all(&state.pool)
                .await?
        }
    };

    let books: Vec<Book> = match normalized(query.q.as_ref()) {
        Some(needle) => books
            .into_iter()
            .filter(|book| matches_query(book, &needle))
            .collect(),
        None => books,
    };

    let total = books.len() as i64;
    let books = books
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Catalog",
        CatalogPage { genres, books },
        Some(meta),
    ))
}
