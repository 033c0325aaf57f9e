use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::NotificationService;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

pub async fn list_notifications(
    user: AuthenticatedUser,
    notifications: web::Data<NotificationService>,
) -> Result<HttpResponse, AppError> {
    let listed = notifications.list_for_user(&user).await?;
    Ok(HttpResponse::Ok().json(listed))
}

pub async fn mark_read(
    user: AuthenticatedUser,
    notification_id: web::Path<Uuid>,
    notifications: web::Data<NotificationService>,
) -> Result<HttpResponse, AppError> {
    let notification = notifications
        .mark_read(&user, notification_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(notification))
}

pub fn configure_notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(list_notifications))
            .route("/{id}/read", web::put().to(mark_read)),
    );
}
