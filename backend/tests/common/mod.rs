#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use sweetshop_backend::models::Sweet;
use sweetshop_backend::repositories::{CatalogRepository, MemoryStore, Store};
use sweetshop_backend::services::Services;
use sweetshop_backend::utils::jwt::JwtService;
use sweetshop_shared::{CreateSweetRequest, UserRole};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-secret-key-that-is-long-enough";

pub struct TestContext {
    pub store: MemoryStore,
    pub services: Services,
    pub jwt_service: JwtService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let jwt_service = JwtService::new(TEST_SECRET).expect("Failed to create JWT service");
        let shared: Arc<dyn Store> = Arc::new(store.clone());
        Self {
            services: Services::new(shared, jwt_service.clone()),
            store,
            jwt_service,
        }
    }

    /// A fresh account id and a bearer header value for it
    pub fn login_as(&self, name: &str, role: UserRole) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let token = self
            .jwt_service
            .issue_user_token(user_id, name.to_string(), role)
            .expect("Failed to issue token");
        (user_id, format!("Bearer {}", token))
    }

    pub async fn seed_sweet(&self, name: &str, price: i64, quantity: i32) -> Sweet {
        let sweet = Sweet::from_request(CreateSweetRequest {
            name: name.to_string(),
            category: "Barfi".to_string(),
            price: Decimal::from(price),
            cost_price: Decimal::from(price / 2),
            list_price: None,
            quantity,
            description: Some(format!("Fresh {}", name)),
            expiry_date: None,
            batch_number: None,
            image: None,
        });
        self.store.insert_sweet(&sweet).await.expect("Failed to seed sweet");
        sweet
    }
}

/// Build the full application over a `TestContext`
#[macro_export]
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(sweetshop_backend::middleware::AuthMiddleware::new(
                    $ctx.jwt_service.clone(),
                ))
                .configure(sweetshop_backend::handlers::configure_app(
                    $ctx.services.clone(),
                )),
        )
        .await
    };
}
