use std::time::Duration;

// JWT Configuration
pub const JWT_ACCESS_TOKEN_EXPIRY: Duration = Duration::from_secs(15 * 60); // 15 minutes
pub const JWT_PARTNER_TOKEN_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60); // 24 hours

// Delivery partner codes: DP-10000 ..= DP-99999
pub const PARTNER_CODE_PREFIX: &str = "DP-";
pub const PARTNER_CODE_MIN: u32 = 10_000;
pub const PARTNER_CODE_MAX: u32 = 99_999;
pub const PARTNER_CODE_MAX_ATTEMPTS: u32 = 10;

// Reviews
pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;
pub const DEFAULT_REVIEWER_NAME: &str = "Anonymous";

// Money columns are NUMERIC(12, 2): at most 9,999,999,999.99
pub const MONEY_SCALE: u32 = 2;
pub const MAX_MONEY_MINOR_UNITS: i64 = 999_999_999_999;

// Short order reference shown to customers
pub const ORDER_REFERENCE_LENGTH: usize = 6;

// Error messages
pub const ERROR_EMPTY_ORDER: &str = "No items in order";
pub const ERROR_INVALID_QUANTITY: &str = "Quantity must be greater than zero";
pub const ERROR_ADMIN_REQUIRED: &str = "Admin access required";
pub const ERROR_SUPERADMIN_REQUIRED: &str = "Access denied. Super Admin only.";
pub const ERROR_INVALID_ROLE: &str = "Invalid role";
pub const ERROR_INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const ERROR_PARTNER_TERMINATED: &str = "Your ID has been terminated. Please contact admin.";
pub const ERROR_ORDER_NOT_ASSIGNED_TO_YOU: &str = "Order not found or not assigned to you";
pub const ERROR_ORDER_NOT_IN_ASSIGNED_STATE: &str = "Order is not in assigned state";
pub const ERROR_PARTNER_FIELDS_REQUIRED: &str = "Name and Mobile are required";
pub const ERROR_OUT_OF_STOCK: &str = "Out of stock";
pub const ERROR_ORDER_TOTAL_TOO_LARGE: &str = "Order total exceeds the maximum amount";

// Success messages
pub const SUCCESS_PARTNER_TERMINATED: &str = "Delivery Partner terminated";
pub const SUCCESS_ORDER_ACCEPTED: &str = "Order accepted and shipped";
