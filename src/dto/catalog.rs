use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::reviews::ReviewView,
    models::{Book, Genre},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct HomePage {
    pub genres: Vec<Genre>,
    pub top_books: Vec<Book>,
    /// Non-empty only when a search query was supplied.
    pub search_results: Vec<Book>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogPage {
    pub genres: Vec<Genre>,
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub reviews: Vec<ReviewView>,
}
