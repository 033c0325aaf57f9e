pub mod auth;

pub use auth::{AuthMiddleware, AuthenticatedPartner, AuthenticatedUser};
