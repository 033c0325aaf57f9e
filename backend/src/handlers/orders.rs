use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::OrderService;
use actix_web::{web, HttpResponse};
use sweetshop_shared::{CreateOrderRequest, UpdateOrderStatusRequest};
use tracing::debug;
use uuid::Uuid;

/// Checkout the caller's cart
pub async fn create_order(
    user: AuthenticatedUser,
    request: web::Json<CreateOrderRequest>,
    orders: web::Data<OrderService>,
) -> Result<HttpResponse, AppError> {
    debug!("Checkout by {} with {} lines", user.user_id, request.items.len());

    let order = orders.create_order(&user, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn my_orders(
    user: AuthenticatedUser,
    orders: web::Data<OrderService>,
) -> Result<HttpResponse, AppError> {
    let mine = orders.my_orders(&user).await?;
    Ok(HttpResponse::Ok().json(mine))
}

pub async fn all_orders(
    user: AuthenticatedUser,
    orders: web::Data<OrderService>,
) -> Result<HttpResponse, AppError> {
    let all = orders.list_all_orders(&user).await?;
    Ok(HttpResponse::Ok().json(all))
}

pub async fn update_status(
    user: AuthenticatedUser,
    order_id: web::Path<Uuid>,
    request: web::Json<UpdateOrderStatusRequest>,
    orders: web::Data<OrderService>,
) -> Result<HttpResponse, AppError> {
    let order = orders
        .update_status(&user, order_id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

pub fn configure_order_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("/mine", web::get().to(my_orders))
            .route("/admin", web::get().to(all_orders))
            .route("/{id}/status", web::put().to(update_status)),
    );
}
