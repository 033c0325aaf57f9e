use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sweetshop_shared::{OrderStatus, ERROR_ORDER_TOTAL_TOO_LARGE, ORDER_REFERENCE_LENGTH};
use uuid::Uuid;

use super::{max_amount, Sweet, User};
use crate::error::AppError;

/// Price and name of a sweet frozen at checkout time.
///
/// Later repricing or renaming of the catalog entry never touches these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub sweet_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub cost_price_at_purchase: Decimal,
}

impl LineItem {
    pub fn snapshot(sweet: &Sweet, quantity: i32) -> Self {
        Self {
            sweet_id: sweet.id,
            name: sweet.name.clone(),
            quantity,
            price_at_purchase: sweet.price,
            cost_price_at_purchase: sweet.cost_price,
        }
    }

    /// `None` when the product does not fit a `Decimal`
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price_at_purchase.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery_partner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// New pending order whose total is derived from its line items.
    ///
    /// Fails with `Validation` when the total is larger than a money column holds.
    pub fn place(user_id: Uuid, items: Vec<LineItem>) -> Result<Self, AppError> {
        let total_amount = Self::total_of(&items)
            .filter(|total| *total <= max_amount())
            .ok_or_else(|| AppError::Validation(ERROR_ORDER_TOTAL_TOO_LARGE.to_string()))?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
            delivery_partner_id: None,
            created_at: Utc::now(),
        })
    }

    pub fn total_of(items: &[LineItem]) -> Option<Decimal> {
        items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.subtotal()?))
    }

    /// Short customer-facing reference: last characters of the id, uppercased
    pub fn reference(&self) -> String {
        let simple = self.id.simple().to_string();
        simple[simple.len() - ORDER_REFERENCE_LENGTH..].to_uppercase()
    }
}

/// Line item decorated with the sweet's current category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLineItem {
    #[serde(flatten)]
    pub item: LineItem,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub username: String,
    pub mobile: Option<String>,
    pub address: Option<String>,
}

impl From<&User> for CustomerSummary {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            mobile: user.mobile.clone(),
            address: user.address.clone(),
        }
    }
}

/// Admin and partner view of an order with customer and catalog data joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub id: Uuid,
    pub reference: String,
    pub user_id: Uuid,
    pub customer: Option<CustomerSummary>,
    pub items: Vec<ResolvedLineItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery_partner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl OrderDetails {
    /// Join an order against looked-up users and sweets. Missing rows stay `None`.
    pub fn resolve(order: Order, users: &HashMap<Uuid, User>, sweets: &HashMap<Uuid, Sweet>) -> Self {
        let reference = order.reference();
        let customer = users.get(&order.user_id).map(CustomerSummary::from);
        let items = order
            .items
            .into_iter()
            .map(|item| ResolvedLineItem {
                category: sweets.get(&item.sweet_id).map(|s| s.category.clone()),
                item,
            })
            .collect();

        Self {
            id: order.id,
            reference,
            user_id: order.user_id,
            customer,
            items,
            total_amount: order.total_amount,
            status: order.status,
            delivery_partner_id: order.delivery_partner_id,
            created_at: order.created_at,
        }
    }
}
