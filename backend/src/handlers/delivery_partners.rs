use crate::error::AppError;
use crate::middleware::{AuthenticatedPartner, AuthenticatedUser};
use crate::services::DeliveryService;
use actix_web::{web, HttpResponse};
use sweetshop_shared::{
    CreatePartnerRequest, MessageResponse, PartnerLoginRequest, SUCCESS_ORDER_ACCEPTED,
    SUCCESS_PARTNER_TERMINATED,
};
use uuid::Uuid;
use validator::Validate;

/// Register a delivery partner (admins only)
pub async fn add_partner(
    user: AuthenticatedUser,
    request: web::Json<CreatePartnerRequest>,
    delivery: web::Data<DeliveryService>,
) -> Result<HttpResponse, AppError> {
    let partner = delivery.issue_partner(&user, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(partner))
}

pub async fn list_partners(
    user: AuthenticatedUser,
    delivery: web::Data<DeliveryService>,
) -> Result<HttpResponse, AppError> {
    let listing = delivery.list_partners(&user).await?;
    Ok(HttpResponse::Ok().json(listing))
}

pub async fn terminate_partner(
    user: AuthenticatedUser,
    partner_id: web::Path<Uuid>,
    delivery: web::Data<DeliveryService>,
) -> Result<HttpResponse, AppError> {
    let partner = delivery
        .terminate_partner(&user, partner_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: SUCCESS_PARTNER_TERMINATED.to_string(),
        data: serde_json::json!({ "partner": partner }),
    }))
}

pub async fn login(
    request: web::Json<PartnerLoginRequest>,
    delivery: web::Data<DeliveryService>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let session = delivery.login(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

pub async fn dashboard(
    partner: AuthenticatedPartner,
    delivery: web::Data<DeliveryService>,
) -> Result<HttpResponse, AppError> {
    let dashboard = delivery.dashboard(&partner).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

pub async fn accept_order(
    partner: AuthenticatedPartner,
    order_id: web::Path<Uuid>,
    delivery: web::Data<DeliveryService>,
) -> Result<HttpResponse, AppError> {
    let order = delivery.accept_order(&partner, order_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: SUCCESS_ORDER_ACCEPTED.to_string(),
        data: serde_json::json!({ "order": order }),
    }))
}

pub fn configure_delivery_partner_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/delivery-partners")
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(dashboard))
            .route("/orders/{id}/accept", web::put().to(accept_order))
            .route("/admin", web::post().to(add_partner))
            .route("/admin", web::get().to(list_partners))
            .route("/admin/{id}/terminate", web::put().to(terminate_partner)),
    );
}
