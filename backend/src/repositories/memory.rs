//! In-process storage engine.
//!
//! All tables sit behind one mutex, so every trait call is atomic with
//! respect to every other. Rows are kept in insertion order and "newest
//! first" listings walk them in reverse.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sweetshop_shared::{
    OrderItemRequest, OrderStatus, PartnerStatus, SweetSearchQuery, UpdatePricingRequest,
    UserRole,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    restock_overflow, stock_error, CatalogRepository, NotificationRepository, OrderRepository,
    PartnerRepository, ReviewRepository, UserDirectory,
};
use crate::error::AppError;
use crate::models::{DeliveryPartner, LineItem, Notification, Order, Review, Sweet, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sweets: Vec<Sweet>,
    orders: Vec<Order>,
    partners: Vec<DeliveryPartner>,
    notifications: Vec<Notification>,
    reviews: Vec<Review>,
}

impl Tables {
    fn sweet_mut(&mut self, id: Uuid) -> Option<&mut Sweet> {
        self.sweets.iter_mut().find(|s| s.id == id)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    #[cfg(test)]
    notifications_offline: Arc<std::sync::atomic::AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every notification write fail, to exercise fire-and-forget paths
    #[cfg(test)]
    pub(crate) fn take_notifications_offline(&self) {
        self.notifications_offline
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_sweets(&self) -> Result<Vec<Sweet>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.sweets.iter().rev().cloned().collect())
    }

    async fn search_sweets(&self, query: &SweetSearchQuery) -> Result<Vec<Sweet>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .sweets
            .iter()
            .rev()
            .filter(|s| s.matches(query))
            .cloned()
            .collect())
    }

    async fn find_sweet(&self, id: Uuid) -> Result<Option<Sweet>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.sweets.iter().find(|s| s.id == id).cloned())
    }

    async fn find_sweets(&self, ids: &[Uuid]) -> Result<Vec<Sweet>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .sweets
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn insert_sweet(&self, sweet: &Sweet) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        if tables.sweets.iter().any(|s| s.id == sweet.id) {
            return Err(AppError::Conflict(format!("Sweet {} already exists", sweet.id)));
        }
        tables.sweets.push(sweet.clone());
        Ok(())
    }

    async fn update_pricing(
        &self,
        id: Uuid,
        pricing: &UpdatePricingRequest,
    ) -> Result<Option<Sweet>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.sweet_mut(id).map(|sweet| {
            sweet.apply_pricing(pricing);
            sweet.clone()
        }))
    }

    async fn restock(&self, id: Uuid, quantity: i32) -> Result<Option<Sweet>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(sweet) = tables.sweet_mut(id) else {
            return Ok(None);
        };

        let restocked = sweet
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| restock_overflow(&sweet.name))?;
        sweet.quantity = restocked;
        Ok(Some(sweet.clone()))
    }

    async fn take_stock(&self, id: Uuid, quantity: i32) -> Result<Sweet, AppError> {
        let mut tables = self.tables.lock().await;
        match tables.sweet_mut(id) {
            Some(sweet) if sweet.has_stock(quantity) => {
                sweet.quantity -= quantity;
                Ok(sweet.clone())
            }
            other => Err(stock_error(other.as_deref(), id)),
        }
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place_order(&self, user_id: Uuid, items: &[OrderItemRequest]) -> Result<Order, AppError> {
        let mut tables = self.tables.lock().await;

        // Work on a scratch copy of remaining quantities; commit only if every line fits.
        let mut remaining: HashMap<Uuid, i32> = HashMap::new();
        let mut lines = Vec::with_capacity(items.len());

        for item in items {
            let sweet = tables.sweets.iter().find(|s| s.id == item.sweet_id);
            let Some(sweet) = sweet else {
                return Err(stock_error(None, item.sweet_id));
            };

            let available = remaining.get(&sweet.id).copied().unwrap_or(sweet.quantity);
            if available < item.quantity {
                return Err(stock_error(Some(sweet), sweet.id));
            }

            remaining.insert(sweet.id, available - item.quantity);
            lines.push(LineItem::snapshot(sweet, item.quantity));
        }

        let order = Order::place(user_id, lines)?;

        for (id, quantity) in remaining {
            if let Some(sweet) = tables.sweet_mut(id) {
                sweet.quantity = quantity;
            }
        }

        tables.orders.push(order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn all_orders(&self) -> Result<Vec<Order>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.orders.iter().rev().cloned().collect())
    }

    async fn orders_for_partner(&self, partner_id: Uuid) -> Result<Vec<Order>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .orders
            .iter()
            .rev()
            .filter(|o| o.delivery_partner_id == Some(partner_id))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        status: OrderStatus,
        partner_id: Option<Uuid>,
    ) -> Result<Option<Order>, AppError> {
        let mut tables = self.tables.lock().await;
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == expected);

        Ok(order.map(|order| {
            order.status = status;
            if partner_id.is_some() {
                order.delivery_partner_id = partner_id;
            }
            order.clone()
        }))
    }
}

#[async_trait]
impl PartnerRepository for MemoryStore {
    async fn insert_partner(&self, partner: &DeliveryPartner) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        if tables.partners.iter().any(|p| p.code == partner.code) {
            return Err(AppError::Conflict(format!(
                "Partner code {} already in use",
                partner.code
            )));
        }
        tables.partners.push(partner.clone());
        Ok(())
    }

    async fn find_partner(&self, id: Uuid) -> Result<Option<DeliveryPartner>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.partners.iter().find(|p| p.id == id).cloned())
    }

    async fn find_partner_by_credentials(
        &self,
        name: &str,
        code: &str,
    ) -> Result<Option<DeliveryPartner>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .partners
            .iter()
            .find(|p| p.matches_credentials(name, code))
            .cloned())
    }

    async fn list_partners(&self) -> Result<Vec<DeliveryPartner>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.partners.iter().rev().cloned().collect())
    }

    async fn terminate_partner(&self, id: Uuid) -> Result<Option<DeliveryPartner>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.partners.iter_mut().find(|p| p.id == id).map(|partner| {
            partner.status = PartnerStatus::Terminated;
            partner.clone()
        }))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        #[cfg(test)]
        if self
            .notifications_offline
            .load(std::sync::atomic::Ordering::SeqCst)
        {
            return Err(AppError::Internal("notification table unavailable".to_string()));
        }

        let mut tables = self.tables.lock().await;
        tables.notifications.push(notification.clone());
        Ok(())
    }

    async fn find_notification(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn notifications_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .map(|notification| {
                notification.is_read = true;
                notification.clone()
            }))
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn insert_review(&self, review: &Review) -> Result<Sweet, AppError> {
        let mut tables = self.tables.lock().await;
        let sweet = tables
            .sweet_mut(review.sweet_id)
            .ok_or_else(|| AppError::NotFound("Sweet not found".to_string()))?;

        sweet.record_rating(review.rating);
        let sweet = sweet.clone();
        tables.reviews.push(review.clone());
        Ok(sweet)
    }

    async fn reviews_for_sweet(&self, sweet_id: Uuid) -> Result<Vec<Review>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reviews
            .iter()
            .rev()
            .filter(|r| r.sweet_id == sweet_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().rev().cloned().collect())
    }

    async fn record_user(&self, user: &User) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        match tables.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                existing.username = user.username.clone();
                Ok(existing.clone())
            }
            None => {
                tables.users.push(user.clone());
                Ok(user.clone())
            }
        }
    }

    async fn update_contact(
        &self,
        id: Uuid,
        mobile: Option<&str>,
        address: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            if let Some(mobile) = mobile {
                user.mobile = Some(mobile.to_string());
            }
            if let Some(address) = address {
                user.address = Some(address.to_string());
            }
            user.clone()
        }))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }
}
