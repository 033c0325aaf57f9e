//! Storefront records and the pure domain rules attached to them.
//!
//! Records here are plain data: persistence lives in `crate::repositories`
//! and workflow orchestration in `crate::services`.

pub mod delivery_partner;
pub mod notification;
pub mod order;
pub mod review;
pub mod sweet;
pub mod user;

use rust_decimal::Decimal;
use sweetshop_shared::{MAX_MONEY_MINOR_UNITS, MONEY_SCALE};

/// Largest price or order total the money columns can store
pub fn max_amount() -> Decimal {
    Decimal::new(MAX_MONEY_MINOR_UNITS, MONEY_SCALE)
}

// Re-export commonly used models
pub use delivery_partner::DeliveryPartner;
pub use notification::Notification;
pub use order::{LineItem, Order, OrderDetails, ResolvedLineItem};
pub use review::Review;
pub use sweet::Sweet;
pub use user::User;
