use std::sync::Arc;

use rust_decimal::Decimal;
use sweetshop_shared::{
    CreateSweetRequest, RestockRequest, SweetSearchQuery, UpdatePricingRequest, ERROR_OUT_OF_STOCK,
    MONEY_SCALE,
};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::{max_amount, Sweet};
use crate::repositories::Store;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_sweets(&self) -> Result<Vec<Sweet>, AppError> {
        self.store.list_sweets().await
    }

    pub async fn get_sweet(&self, sweet_id: Uuid) -> Result<Sweet, AppError> {
        self.store
            .find_sweet(sweet_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sweet not found".to_string()))
    }

    pub async fn search_sweets(&self, query: SweetSearchQuery) -> Result<Vec<Sweet>, AppError> {
        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(AppError::Validation(
                    "min_price must not exceed max_price".to_string(),
                ));
            }
        }

        let sweets = self.store.search_sweets(&query).await?;
        debug!("Catalog search {:?} matched {} sweets", query, sweets.len());
        Ok(sweets)
    }

    pub async fn add_sweet(
        &self,
        caller: &AuthenticatedUser,
        request: CreateSweetRequest,
    ) -> Result<Sweet, AppError> {
        caller.require_admin()?;
        request.validate()?;
        ensure_valid_prices(&[
            Some(request.price),
            Some(request.cost_price),
            request.list_price,
        ])?;
        if request.name.trim().is_empty() || request.category.trim().is_empty() {
            return Err(AppError::Validation(
                "Name and category are required".to_string(),
            ));
        }

        let sweet = Sweet::from_request(request);
        self.store.insert_sweet(&sweet).await?;

        info!("Sweet {} ({}) added with {} in stock", sweet.id, sweet.name, sweet.quantity);
        Ok(sweet)
    }

    /// Reprice a sweet. Line items already on orders keep their snapshot.
    pub async fn update_pricing(
        &self,
        caller: &AuthenticatedUser,
        sweet_id: Uuid,
        request: UpdatePricingRequest,
    ) -> Result<Sweet, AppError> {
        caller.require_admin()?;
        ensure_valid_prices(&[request.price, request.cost_price, request.list_price])?;

        let sweet = self
            .store
            .update_pricing(sweet_id, &request)
            .await?
            .ok_or_else(|| AppError::NotFound("Sweet not found".to_string()))?;

        info!("Sweet {} repriced to {}", sweet.id, sweet.price);
        Ok(sweet)
    }

    pub async fn restock(
        &self,
        caller: &AuthenticatedUser,
        sweet_id: Uuid,
        request: RestockRequest,
    ) -> Result<Sweet, AppError> {
        caller.require_admin()?;
        request.validate()?;

        let sweet = self
            .store
            .restock(sweet_id, request.quantity)
            .await?
            .ok_or_else(|| AppError::NotFound("Sweet not found".to_string()))?;

        info!(
            "Sweet {} restocked by {} to {}",
            sweet.id, request.quantity, sweet.quantity
        );
        Ok(sweet)
    }

    /// Buy a single unit outside of the cart flow
    pub async fn purchase_one(
        &self,
        caller: &AuthenticatedUser,
        sweet_id: Uuid,
    ) -> Result<Sweet, AppError> {
        let sweet = self
            .store
            .take_stock(sweet_id, 1)
            .await
            .map_err(|e| match e {
                AppError::InsufficientStock(_) => {
                    AppError::InsufficientStock(ERROR_OUT_OF_STOCK.to_string())
                }
                other => other,
            })?;

        info!("User {} bought one {} ({} left)", caller.user_id, sweet.name, sweet.quantity);
        Ok(sweet)
    }
}

/// Prices must fit the NUMERIC(12, 2) money columns
fn ensure_valid_prices(prices: &[Option<Decimal>]) -> Result<(), AppError> {
    for price in prices.iter().flatten() {
        if *price < Decimal::ZERO {
            return Err(AppError::Validation("Prices must not be negative".to_string()));
        }
        if *price > max_amount() {
            return Err(AppError::Validation(format!(
                "Prices must not exceed {}",
                max_amount()
            )));
        }
        if price.normalize().scale() > MONEY_SCALE {
            return Err(AppError::Validation(format!(
                "Prices must have at most {} decimal places",
                MONEY_SCALE
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use sweetshop_shared::UserRole;

    fn setup() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::new()))
    }

    fn caller(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            name: "caller".to_string(),
            role,
        }
    }

    fn laddu(quantity: i32) -> CreateSweetRequest {
        CreateSweetRequest {
            name: "Motichoor Laddu".to_string(),
            category: "Laddu".to_string(),
            price: Decimal::from(12),
            cost_price: Decimal::from(7),
            list_price: Some(Decimal::from(15)),
            quantity,
            description: Some("Fried gram flour pearls".to_string()),
            expiry_date: None,
            batch_number: Some("B-001".to_string()),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_add_sweet_is_admin_only() {
        let service = setup();

        let denied = service.add_sweet(&caller(UserRole::User), laddu(5)).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let sweet = service.add_sweet(&caller(UserRole::Admin), laddu(5)).await.unwrap();
        assert_eq!(service.get_sweet(sweet.id).await.unwrap().quantity, 5);
        assert_eq!(service.list_sweets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_sweet_rejects_negative_values() {
        let service = setup();
        let admin = caller(UserRole::Admin);

        let mut negative_price = laddu(5);
        negative_price.price = Decimal::from(-1);
        assert!(matches!(
            service.add_sweet(&admin, negative_price).await,
            Err(AppError::Validation(_))
        ));

        assert!(matches!(
            service.add_sweet(&admin, laddu(-3)).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_prices_must_fit_money_columns() {
        let service = setup();
        let admin = caller(UserRole::Admin);

        let mut too_large = laddu(5);
        too_large.price = Decimal::MAX;
        assert!(matches!(
            service.add_sweet(&admin, too_large).await,
            Err(AppError::Validation(_))
        ));

        let mut too_precise = laddu(5);
        too_precise.cost_price = "7.125".parse().unwrap();
        assert!(matches!(
            service.add_sweet(&admin, too_precise).await,
            Err(AppError::Validation(_))
        ));

        let mut at_limit = laddu(5);
        at_limit.price = max_amount();
        at_limit.list_price = Some("12.50".parse().unwrap());
        let sweet = service.add_sweet(&admin, at_limit).await.unwrap();

        let repriced = service
            .update_pricing(
                &admin,
                sweet.id,
                UpdatePricingRequest {
                    list_price: Some(Decimal::MAX),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(repriced, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_restock_past_stock_limit_is_rejected() {
        let service = setup();
        let admin = caller(UserRole::Admin);
        let sweet = service.add_sweet(&admin, laddu(1)).await.unwrap();

        let overflow = service
            .restock(&admin, sweet.id, RestockRequest { quantity: i32::MAX })
            .await;
        assert!(matches!(overflow, Err(AppError::Validation(_))));
        assert_eq!(service.get_sweet(sweet.id).await.unwrap().quantity, 1);

        let topped_up = service
            .restock(&admin, sweet.id, RestockRequest { quantity: i32::MAX - 1 })
            .await
            .unwrap();
        assert_eq!(topped_up.quantity, i32::MAX);

        let missing = service
            .restock(&admin, Uuid::new_v4(), RestockRequest { quantity: 1 })
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_restock_and_purchase_one() {
        let service = setup();
        let admin = caller(UserRole::Admin);
        let shopper = caller(UserRole::User);
        let sweet = service.add_sweet(&admin, laddu(1)).await.unwrap();

        let bought = service.purchase_one(&shopper, sweet.id).await.unwrap();
        assert_eq!(bought.quantity, 0);

        let sold_out = service.purchase_one(&shopper, sweet.id).await;
        assert!(matches!(sold_out, Err(AppError::InsufficientStock(ref m)) if m == "Out of stock"));

        let invalid = service
            .restock(&admin, sweet.id, RestockRequest { quantity: 0 })
            .await;
        assert!(matches!(invalid, Err(AppError::Validation(_))));

        let restocked = service
            .restock(&admin, sweet.id, RestockRequest { quantity: 4 })
            .await
            .unwrap();
        assert_eq!(restocked.quantity, 4);

        let denied = service
            .restock(&shopper, sweet.id, RestockRequest { quantity: 4 })
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_pricing_keeps_unspecified_fields() {
        let service = setup();
        let admin = caller(UserRole::Admin);
        let sweet = service.add_sweet(&admin, laddu(5)).await.unwrap();

        let updated = service
            .update_pricing(
                &admin,
                sweet.id,
                UpdatePricingRequest {
                    price: Some(Decimal::from(10)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, Decimal::from(10));
        assert_eq!(updated.cost_price, Decimal::from(7));
        assert_eq!(updated.list_price, Some(Decimal::from(15)));

        let missing = service
            .update_pricing(&admin, Uuid::new_v4(), UpdatePricingRequest::default())
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_validates_price_range() {
        let service = setup();
        service.add_sweet(&caller(UserRole::Admin), laddu(5)).await.unwrap();

        let found = service
            .search_sweets(SweetSearchQuery {
                query: Some("laddu".to_string()),
                category: Some("All".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let inverted = service
            .search_sweets(SweetSearchQuery {
                min_price: Some(Decimal::from(20)),
                max_price: Some(Decimal::from(10)),
                ..Default::default()
            })
            .await;
        assert!(matches!(inverted, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_unknown_sweet() {
        let service = setup();
        assert!(matches!(
            service.get_sweet(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
