use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Book, Review};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub rating: i32,
    pub text: Option<String>,
}

/// Review joined with the reviewer's display name.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ReviewView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewSubmitted {
    pub review: Review,
    /// The book with its freshly recomputed rating and rating_count.
    pub book: Book,
}
