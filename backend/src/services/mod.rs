//! Storefront workflows.
//!
//! Services own every business rule: role gating, state-machine checks,
//! and the notifications emitted as side effects. Handlers only translate
//! HTTP to service calls.

use std::sync::Arc;

use crate::repositories::Store;
use crate::utils::jwt::JwtService;

pub mod catalog_service;
pub mod delivery_service;
pub mod notification_service;
pub mod order_service;
pub mod review_service;
pub mod user_service;

pub use catalog_service::CatalogService;
pub use delivery_service::DeliveryService;
pub use notification_service::NotificationService;
pub use order_service::OrderService;
pub use review_service::ReviewService;
pub use user_service::UserService;

/// Every service wired over one shared store
#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub delivery: DeliveryService,
    pub notifications: NotificationService,
    pub reviews: ReviewService,
    pub users: UserService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, jwt_service: JwtService) -> Self {
        let notifications = NotificationService::new(store.clone());

        Self {
            catalog: CatalogService::new(store.clone()),
            orders: OrderService::new(store.clone(), notifications.clone()),
            delivery: DeliveryService::new(store.clone(), notifications.clone(), jwt_service),
            reviews: ReviewService::new(store.clone()),
            users: UserService::new(store),
            notifications,
        }
    }
}
