use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::{CatalogService, ReviewService};
use actix_web::{web, HttpResponse};
use sweetshop_shared::{
    CreateReviewRequest, CreateSweetRequest, RestockRequest, SweetSearchQuery, UpdatePricingRequest,
};
use tracing::debug;
use uuid::Uuid;

/// List the whole catalog
pub async fn list_sweets(catalog: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let sweets = catalog.list_sweets().await?;
    Ok(HttpResponse::Ok().json(sweets))
}

pub async fn search_sweets(
    query: web::Query<SweetSearchQuery>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let sweets = catalog.search_sweets(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(sweets))
}

pub async fn get_sweet(
    sweet_id: web::Path<Uuid>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let sweet = catalog.get_sweet(sweet_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(sweet))
}

/// Add a sweet to the catalog (admins only)
pub async fn add_sweet(
    user: AuthenticatedUser,
    request: web::Json<CreateSweetRequest>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let sweet = catalog.add_sweet(&user, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(sweet))
}

pub async fn update_pricing(
    user: AuthenticatedUser,
    sweet_id: web::Path<Uuid>,
    request: web::Json<UpdatePricingRequest>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let sweet = catalog
        .update_pricing(&user, sweet_id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(sweet))
}

pub async fn restock(
    user: AuthenticatedUser,
    sweet_id: web::Path<Uuid>,
    request: web::Json<RestockRequest>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let sweet = catalog
        .restock(&user, sweet_id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(sweet))
}

/// Buy a single unit
pub async fn purchase(
    user: AuthenticatedUser,
    sweet_id: web::Path<Uuid>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let sweet = catalog.purchase_one(&user, sweet_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(sweet))
}

pub async fn list_reviews(
    sweet_id: web::Path<Uuid>,
    reviews: web::Data<ReviewService>,
) -> Result<HttpResponse, AppError> {
    let listed = reviews.list_reviews(sweet_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listed))
}

pub async fn add_review(
    user: AuthenticatedUser,
    sweet_id: web::Path<Uuid>,
    request: web::Json<CreateReviewRequest>,
    reviews: web::Data<ReviewService>,
) -> Result<HttpResponse, AppError> {
    let sweet_id = sweet_id.into_inner();
    debug!("User {} reviewing sweet {}", user.user_id, sweet_id);

    let review = reviews.add_review(&user, sweet_id, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(review))
}

pub fn configure_sweet_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sweets")
            .route("", web::get().to(list_sweets))
            .route("", web::post().to(add_sweet))
            // Must precede the `{id}` routes
            .route("/search", web::get().to(search_sweets))
            .route("/{id}", web::get().to(get_sweet))
            .route("/{id}/pricing", web::put().to(update_pricing))
            .route("/{id}/restock", web::post().to(restock))
            .route("/{id}/purchase", web::post().to(purchase))
            .route("/{id}/reviews", web::get().to(list_reviews))
            .route("/{id}/reviews", web::post().to(add_review)),
    );
}
