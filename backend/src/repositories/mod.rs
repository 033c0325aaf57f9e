//! Persistence seams for the storefront.
//!
//! Every aggregate gets its own async trait so services can be exercised
//! against the in-memory engine in tests and against Postgres in production.
//! Operations that must be atomic (checkout, status compare-and-set, stock
//! debits, rating aggregation) are single trait calls so each engine can
//! implement them inside its own transaction or lock.

use async_trait::async_trait;
use sweetshop_shared::{
    OrderItemRequest, OrderStatus, SweetSearchQuery, UpdatePricingRequest, UserRole,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{DeliveryPartner, Notification, Order, Review, Sweet, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_sweets(&self) -> Result<Vec<Sweet>, AppError>;

    async fn search_sweets(&self, query: &SweetSearchQuery) -> Result<Vec<Sweet>, AppError>;

    async fn find_sweet(&self, id: Uuid) -> Result<Option<Sweet>, AppError>;

    async fn find_sweets(&self, ids: &[Uuid]) -> Result<Vec<Sweet>, AppError>;

    async fn insert_sweet(&self, sweet: &Sweet) -> Result<(), AppError>;

    async fn update_pricing(
        &self,
        id: Uuid,
        pricing: &UpdatePricingRequest,
    ) -> Result<Option<Sweet>, AppError>;

    /// Add units to stock, returning the updated sweet.
    ///
    /// Fails with `Validation` when the new level would not fit the stock column.
    async fn restock(&self, id: Uuid, quantity: i32) -> Result<Option<Sweet>, AppError>;

    /// Remove units only if enough remain.
    ///
    /// Fails with `NotFound` for an unknown sweet and `InsufficientStock`
    /// when fewer than `quantity` units are on hand.
    async fn take_stock(&self, id: Uuid, quantity: i32) -> Result<Sweet, AppError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Debit stock for every item and persist a pending order, all or nothing.
    async fn place_order(&self, user_id: Uuid, items: &[OrderItemRequest]) -> Result<Order, AppError>;

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, AppError>;

    /// Newest first
    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError>;

    /// Newest first
    async fn all_orders(&self) -> Result<Vec<Order>, AppError>;

    /// Newest first
    async fn orders_for_partner(&self, partner_id: Uuid) -> Result<Vec<Order>, AppError>;

    /// Compare-and-set on the order status.
    ///
    /// Returns `None` when the order is missing or no longer in `expected`.
    /// A `partner_id` of `None` keeps the current assignment.
    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        status: OrderStatus,
        partner_id: Option<Uuid>,
    ) -> Result<Option<Order>, AppError>;
}

#[async_trait]
pub trait PartnerRepository: Send + Sync {
    /// Fails with `Conflict` when the code is already taken
    async fn insert_partner(&self, partner: &DeliveryPartner) -> Result<(), AppError>;

    async fn find_partner(&self, id: Uuid) -> Result<Option<DeliveryPartner>, AppError>;

    async fn find_partner_by_credentials(
        &self,
        name: &str,
        code: &str,
    ) -> Result<Option<DeliveryPartner>, AppError>;

    /// Newest first
    async fn list_partners(&self) -> Result<Vec<DeliveryPartner>, AppError>;

    async fn terminate_partner(&self, id: Uuid) -> Result<Option<DeliveryPartner>, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError>;

    async fn find_notification(&self, id: Uuid) -> Result<Option<Notification>, AppError>;

    /// Newest first
    async fn notifications_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError>;

    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>, AppError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Store the review and fold its rating into the sweet's aggregate
    async fn insert_review(&self, review: &Review) -> Result<Sweet, AppError>;

    /// Newest first
    async fn reviews_for_sweet(&self, sweet_id: Uuid) -> Result<Vec<Review>, AppError>;
}

/// Local mirror of accounts owned by the external auth service.
///
/// Rows are created from verified sessions. Contact details are set by the
/// customer and roles by a superadmin.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError>;

    /// Newest first
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Insert the account if unknown, otherwise refresh its username only.
    ///
    /// Stored contact details and role are kept. Returns the stored row.
    async fn record_user(&self, user: &User) -> Result<User, AppError>;

    /// A `None` field keeps the stored value
    async fn update_contact(
        &self,
        id: Uuid,
        mobile: Option<&str>,
        address: Option<&str>,
    ) -> Result<Option<User>, AppError>;

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, AppError>;
}

/// Everything a storage engine has to provide
pub trait Store:
    CatalogRepository
    + OrderRepository
    + PartnerRepository
    + NotificationRepository
    + ReviewRepository
    + UserDirectory
{
}

impl<T> Store for T where
    T: CatalogRepository
        + OrderRepository
        + PartnerRepository
        + NotificationRepository
        + ReviewRepository
        + UserDirectory
{
}

/// Error for a stock debit that could not be applied
pub(crate) fn stock_error(sweet: Option<&Sweet>, id: Uuid) -> AppError {
    match sweet {
        Some(sweet) => AppError::InsufficientStock(format!("Insufficient stock for {}", sweet.name)),
        None => AppError::NotFound(format!("Sweet not found: {}", id)),
    }
}

/// Error for a restock that would push stock past `i32::MAX`
pub(crate) fn restock_overflow(name: &str) -> AppError {
    AppError::Validation(format!("Restock would exceed the maximum stock level for {}", name))
}
