use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub sweet_id: Uuid,
    pub user_id: Uuid,
    /// Display name captured when the review was written
    pub username: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(sweet_id: Uuid, user_id: Uuid, username: String, rating: i16, comment: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sweet_id,
            user_id,
            username,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}
