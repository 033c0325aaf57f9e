use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sweetshop_shared::UserRole;
use uuid::Uuid;

/// Customer/admin account as mirrored from the auth service.
///
/// Rows are recorded from sessions; the role column is owned by the superadmin.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            mobile: None,
            address: None,
            role,
            created_at: Utc::now(),
        }
    }
}
