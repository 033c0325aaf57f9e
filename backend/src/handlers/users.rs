use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::UserService;
use actix_web::{web, HttpResponse};
use sweetshop_shared::{UpdateProfileRequest, UpdateRoleRequest};
use uuid::Uuid;

pub async fn profile(
    user: AuthenticatedUser,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let profile = users.profile(&user).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Set the caller's delivery contact
pub async fn update_profile(
    user: AuthenticatedUser,
    request: web::Json<UpdateProfileRequest>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let profile = users.update_profile(&user, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn list_users(
    user: AuthenticatedUser,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let listed = users.list_users(&user).await?;
    Ok(HttpResponse::Ok().json(listed))
}

pub async fn change_role(
    user: AuthenticatedUser,
    user_id: web::Path<Uuid>,
    request: web::Json<UpdateRoleRequest>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let updated = users
        .change_role(&user, user_id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/me", web::get().to(profile))
            .route("/me", web::put().to(update_profile))
            .route("/{id}/role", web::put().to(change_role)),
    );
}
