pub mod delivery_partners;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod sweets;
pub mod users;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::AppError;
use crate::services::Services;

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

/// Register every API route under `/api/v1`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(|err, _| {
            AppError::Validation(err.to_string()).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _| {
            AppError::Validation(err.to_string()).into()
        }))
        .service(
            web::scope("/api/v1")
                .service(health::health_check)
                .configure(sweets::configure_sweet_routes)
                .configure(orders::configure_order_routes)
                .configure(delivery_partners::configure_delivery_partner_routes)
                .configure(notifications::configure_notification_routes)
                .configure(users::configure_user_routes),
        );
}

/// Share the services with handlers and mount the routes
pub fn configure_app(services: Services) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(services.catalog))
            .app_data(web::Data::new(services.orders))
            .app_data(web::Data::new(services.delivery))
            .app_data(web::Data::new(services.notifications))
            .app_data(web::Data::new(services.reviews))
            .app_data(web::Data::new(services.users));
        configure(cfg);
    }
}
