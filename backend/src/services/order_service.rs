use std::collections::HashMap;
use std::sync::Arc;

use sweetshop_shared::{
    CreateOrderRequest, OrderStatus, UpdateOrderStatusRequest, ERROR_EMPTY_ORDER,
    ERROR_INVALID_QUANTITY,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::user_service::record_caller;
use super::NotificationService;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::{Notification, Order, OrderDetails};
use crate::repositories::Store;

#[cfg(test)]
mod tests;

/// Checkout and the order status workflow
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    notifications: NotificationService,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>, notifications: NotificationService) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Reserve stock for every line and record a pending order.
    ///
    /// Either every line is debited and the order exists, or nothing changes.
    pub async fn create_order(
        &self,
        caller: &AuthenticatedUser,
        request: CreateOrderRequest,
    ) -> Result<Order, AppError> {
        if request.items.is_empty() {
            return Err(AppError::Validation(ERROR_EMPTY_ORDER.to_string()));
        }
        if request.items.iter().any(|item| item.quantity <= 0) {
            return Err(AppError::Validation(ERROR_INVALID_QUANTITY.to_string()));
        }

        record_caller(self.store.as_ref(), caller).await?;
        let order = self.store.place_order(caller.user_id, &request.items).await?;

        info!(
            "Order {} placed by {} ({} lines, total {})",
            order.id,
            caller.user_id,
            order.items.len(),
            order.total_amount
        );
        Ok(order)
    }

    /// The caller's own orders, newest first
    pub async fn my_orders(&self, caller: &AuthenticatedUser) -> Result<Vec<Order>, AppError> {
        self.store.orders_for_user(caller.user_id).await
    }

    /// Every order with customer contact and current categories resolved
    pub async fn list_all_orders(
        &self,
        caller: &AuthenticatedUser,
    ) -> Result<Vec<OrderDetails>, AppError> {
        caller.require_admin()?;
        let orders = self.store.all_orders().await?;
        resolve_order_details(self.store.as_ref(), orders).await
    }

    /// Move an order along its lifecycle, optionally binding a delivery partner.
    pub async fn update_status(
        &self,
        caller: &AuthenticatedUser,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<Order, AppError> {
        caller.require_admin()?;

        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Order is {} and can no longer change",
                order.status
            )));
        }
        if !order.status.can_transition_to(request.status) {
            return Err(AppError::InvalidState(format!(
                "Cannot move order from {} to {}",
                order.status, request.status
            )));
        }

        let partner_to_check = match (request.status, request.delivery_partner_id) {
            (_, Some(partner_id)) => Some(partner_id),
            (OrderStatus::Assigned, None) => Some(order.delivery_partner_id.ok_or_else(|| {
                AppError::Validation("A delivery partner is required to assign an order".to_string())
            })?),
            _ => None,
        };
        if let Some(partner_id) = partner_to_check {
            self.ensure_partner_available(partner_id).await?;
        }

        let updated = match self
            .store
            .update_status(order_id, order.status, request.status, request.delivery_partner_id)
            .await?
        {
            Some(updated) => updated,
            None => {
                warn!("Order {} changed underneath a status update", order_id);
                return Err(match self.store.find_order(order_id).await? {
                    Some(current) => AppError::InvalidState(format!(
                        "Order is now {} and cannot move to {}",
                        current.status, request.status
                    )),
                    None => AppError::NotFound("Order not found".to_string()),
                });
            }
        };

        info!(
            "Order {} moved from {} to {} by {}",
            order_id, order.status, updated.status, caller.user_id
        );

        self.notifications
            .notify(
                updated.user_id,
                Notification::status_changed_message(&updated, updated.status),
            )
            .await;

        Ok(updated)
    }

    async fn ensure_partner_available(&self, partner_id: Uuid) -> Result<(), AppError> {
        let partner = self
            .store
            .find_partner(partner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery Partner not found".to_string()))?;

        if !partner.is_active() {
            return Err(AppError::InvalidState(format!(
                "Delivery Partner {} is terminated",
                partner.name
            )));
        }
        Ok(())
    }
}

/// Join orders with their customers and the current catalog entries
pub(crate) async fn resolve_order_details(
    store: &dyn Store,
    orders: Vec<Order>,
) -> Result<Vec<OrderDetails>, AppError> {
    let mut user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let mut sweet_ids: Vec<Uuid> = orders
        .iter()
        .flat_map(|o| o.items.iter().map(|item| item.sweet_id))
        .collect();
    sweet_ids.sort_unstable();
    sweet_ids.dedup();

    let users: HashMap<_, _> = store
        .find_users(&user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let sweets: HashMap<_, _> = store
        .find_sweets(&sweet_ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(orders
        .into_iter()
        .map(|order| OrderDetails::resolve(order, &users, &sweets))
        .collect())
}
