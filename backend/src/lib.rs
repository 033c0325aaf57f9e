//! Sweet shop storefront backend: catalog, checkout, order workflow,
//! delivery partners and customer notifications.

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use error::AppError;
