use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sweetshop_shared::OrderStatus;
use uuid::Uuid;

use super::Order;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// A fresh, unread notification
    pub fn new(user_id: Uuid, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            message,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    pub fn status_changed_message(order: &Order, status: OrderStatus) -> String {
        format!(
            "Your Order #{} is now {}.",
            order.reference(),
            status.to_string().to_uppercase()
        )
    }

    pub fn shipped_by_partner_message(order: &Order, partner_name: &str) -> String {
        format!(
            "Your Order #{} has been SHIPPED by {}.",
            order.reference(),
            partner_name
        )
    }
}
