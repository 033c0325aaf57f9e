use crate::types::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Order DTOs
// Emptiness and quantity are checked by the order workflow itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub sweet_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub delivery_partner_id: Option<Uuid>,
}

// Delivery partner DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePartnerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 20))]
    pub mobile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PartnerLoginRequest {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1))]
    pub code: String,
}

// Catalog DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSweetRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    pub price: Decimal,

    #[serde(default)]
    pub cost_price: Decimal,

    pub list_price: Option<Decimal>,

    #[validate(range(min = 0))]
    #[serde(default)]
    pub quantity: i32,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub expiry_date: Option<chrono::NaiveDate>,
    pub batch_number: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePricingRequest {
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub list_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RestockRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweetSearchQuery {
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

// Review DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,

    #[validate(length(max = 2000))]
    #[serde(default)]
    pub comment: String,
}

// User directory DTOs
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 20))]
    pub mobile: Option<String>,

    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

// Generic message envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse<T> {
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}
