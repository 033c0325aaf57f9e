use super::*;
use crate::models::{DeliveryPartner, Sweet};
use crate::repositories::{
    CatalogRepository, MemoryStore, NotificationRepository, OrderRepository, PartnerRepository,
    UserDirectory,
};
use rust_decimal::Decimal;
use sweetshop_shared::{
    CreateSweetRequest, OrderItemRequest, PartnerStatus, UpdatePricingRequest, UserRole,
};

struct Fixture {
    store: MemoryStore,
    service: OrderService,
}

fn setup() -> Fixture {
    let store = MemoryStore::new();
    let shared: Arc<dyn Store> = Arc::new(store.clone());
    let notifications = NotificationService::new(shared.clone());
    Fixture {
        service: OrderService::new(shared, notifications),
        store,
    }
}

fn caller(role: UserRole) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
        name: format!("{}-caller", role),
        role,
    }
}

async fn seed_sweet(store: &MemoryStore, name: &str, price: i64, quantity: i32) -> Sweet {
    let sweet = Sweet::from_request(CreateSweetRequest {
        name: name.to_string(),
        category: "Barfi".to_string(),
        price: Decimal::from(price),
        cost_price: Decimal::from(price / 2),
        list_price: None,
        quantity,
        description: None,
        expiry_date: None,
        batch_number: None,
        image: None,
    });
    store.insert_sweet(&sweet).await.unwrap();
    sweet
}

async fn seed_partner(store: &MemoryStore, code: &str) -> DeliveryPartner {
    let partner = DeliveryPartner::new("Raj".to_string(), "9990001111".to_string(), code.to_string());
    store.insert_partner(&partner).await.unwrap();
    partner
}

fn order_of(sweet: &Sweet, quantity: i32) -> CreateOrderRequest {
    CreateOrderRequest {
        items: vec![OrderItemRequest {
            sweet_id: sweet.id,
            quantity,
        }],
    }
}

fn status(status: OrderStatus, partner: Option<Uuid>) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status,
        delivery_partner_id: partner,
    }
}

#[tokio::test]
async fn test_checkout_debits_stock_and_totals_snapshot() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Kaju Barfi", 10, 5).await;
    let shopper = caller(UserRole::User);

    let order = fx.service.create_order(&shopper, order_of(&sweet, 3)).await.unwrap();

    assert_eq!(order.total_amount, Decimal::from(30));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, shopper.user_id);
    assert_eq!(order.items[0].price_at_purchase, Decimal::from(10));
    assert_eq!(order.items[0].cost_price_at_purchase, Decimal::from(5));
    assert_eq!(fx.store.find_sweet(sweet.id).await.unwrap().unwrap().quantity, 2);
}

#[tokio::test]
async fn test_checkout_is_all_or_nothing() {
    let fx = setup();
    let first = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let second = seed_sweet(&fx.store, "Rasgulla", 20, 1).await;
    let shopper = caller(UserRole::User);

    let request = CreateOrderRequest {
        items: vec![
            OrderItemRequest { sweet_id: first.id, quantity: 4 },
            OrderItemRequest { sweet_id: second.id, quantity: 2 },
        ],
    };
    let result = fx.service.create_order(&shopper, request).await;

    assert!(matches!(result, Err(AppError::InsufficientStock(_))));
    assert_eq!(fx.store.find_sweet(first.id).await.unwrap().unwrap().quantity, 10);
    assert_eq!(fx.store.find_sweet(second.id).await.unwrap().unwrap().quantity, 1);
    assert!(fx.service.my_orders(&shopper).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_rejects_bad_input() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let shopper = caller(UserRole::User);

    let empty = fx
        .service
        .create_order(&shopper, CreateOrderRequest { items: vec![] })
        .await;
    assert!(matches!(empty, Err(AppError::Validation(ref m)) if m == "No items in order"));

    let zero = fx.service.create_order(&shopper, order_of(&sweet, 0)).await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    let unknown = CreateOrderRequest {
        items: vec![OrderItemRequest { sweet_id: Uuid::new_v4(), quantity: 1 }],
    };
    let missing = fx.service.create_order(&shopper, unknown).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    assert_eq!(fx.store.find_sweet(sweet.id).await.unwrap().unwrap().quantity, 10);
}

#[tokio::test]
async fn test_checkout_records_customer_in_directory() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let shopper = AuthenticatedUser {
        name: "ravi".to_string(),
        ..caller(UserRole::User)
    };

    fx.service.create_order(&shopper, order_of(&sweet, 1)).await.unwrap();

    let recorded = fx.store.find_user(shopper.user_id).await.unwrap().expect("recorded");
    assert_eq!(recorded.username, "ravi");
    assert_eq!(recorded.role, UserRole::User);

    let orders = fx.service.list_all_orders(&caller(UserRole::Admin)).await.unwrap();
    let summary = orders[0].customer.as_ref().expect("customer resolved");
    assert_eq!(summary.username, "ravi");
    assert!(summary.mobile.is_none());
}

#[tokio::test]
async fn test_checkout_total_beyond_money_range_is_rejected() {
    let fx = setup();
    let mut sweet = seed_sweet(&fx.store, "Saffron Peda", 1, 10).await;
    let repricing = UpdatePricingRequest {
        price: Some(crate::models::max_amount()),
        ..Default::default()
    };
    sweet = fx.store.update_pricing(sweet.id, &repricing).await.unwrap().unwrap();
    let shopper = caller(UserRole::User);

    let result = fx.service.create_order(&shopper, order_of(&sweet, 2)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(fx.store.find_sweet(sweet.id).await.unwrap().unwrap().quantity, 10);
    assert!(fx.service.my_orders(&shopper).await.unwrap().is_empty());

    let single = fx.service.create_order(&shopper, order_of(&sweet, 1)).await.unwrap();
    assert_eq!(single.total_amount, crate::models::max_amount());
}

#[tokio::test]
async fn test_repricing_leaves_placed_orders_alone() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Kaju Barfi", 10, 5).await;
    let shopper = caller(UserRole::User);
    let order = fx.service.create_order(&shopper, order_of(&sweet, 2)).await.unwrap();

    let repricing = UpdatePricingRequest {
        price: Some(Decimal::from(99)),
        ..Default::default()
    };
    fx.store.update_pricing(sweet.id, &repricing).await.unwrap();

    let mine = fx.service.my_orders(&shopper).await.unwrap();
    assert_eq!(mine[0].id, order.id);
    assert_eq!(mine[0].items[0].price_at_purchase, Decimal::from(10));
    assert_eq!(mine[0].total_amount, Decimal::from(20));
}

#[tokio::test]
async fn test_my_orders_only_lists_callers_orders_newest_first() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let shopper = caller(UserRole::User);
    let other = caller(UserRole::User);

    let older = fx.service.create_order(&shopper, order_of(&sweet, 1)).await.unwrap();
    fx.service.create_order(&other, order_of(&sweet, 1)).await.unwrap();
    let newer = fx.service.create_order(&shopper, order_of(&sweet, 2)).await.unwrap();

    let mine = fx.service.my_orders(&shopper).await.unwrap();
    let ids: Vec<Uuid> = mine.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn test_list_all_orders_is_admin_only_and_resolves_customers() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let shopper = AuthenticatedUser {
        name: "asha".to_string(),
        ..caller(UserRole::User)
    };
    fx.service.create_order(&shopper, order_of(&sweet, 1)).await.unwrap();
    fx.store
        .update_contact(shopper.user_id, Some("9876543210"), Some("12 MG Road"))
        .await
        .unwrap();

    let denied = fx.service.list_all_orders(&shopper).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let orders = fx.service.list_all_orders(&caller(UserRole::Superadmin)).await.unwrap();
    assert_eq!(orders.len(), 1);
    let summary = orders[0].customer.as_ref().expect("customer resolved");
    assert_eq!(summary.username, "asha");
    assert_eq!(summary.mobile.as_deref(), Some("9876543210"));
    assert_eq!(orders[0].items[0].category.as_deref(), Some("Barfi"));
}

#[tokio::test]
async fn test_update_status_requires_admin() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let shopper = caller(UserRole::User);
    let order = fx.service.create_order(&shopper, order_of(&sweet, 1)).await.unwrap();

    let result = fx
        .service
        .update_status(&shopper, order.id, status(OrderStatus::Cancelled, None))
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_assign_then_ship_notifies_customer() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let partner = seed_partner(&fx.store, "DP-12345").await;
    let shopper = caller(UserRole::User);
    let admin = caller(UserRole::Admin);
    let order = fx.service.create_order(&shopper, order_of(&sweet, 1)).await.unwrap();

    let assigned = fx
        .service
        .update_status(&admin, order.id, status(OrderStatus::Assigned, Some(partner.id)))
        .await
        .unwrap();
    assert_eq!(assigned.status, OrderStatus::Assigned);
    assert_eq!(assigned.delivery_partner_id, Some(partner.id));

    let shipped = fx
        .service
        .update_status(&admin, order.id, status(OrderStatus::Shipped, Some(partner.id)))
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let inbox = fx.store.notifications_for_user(shopper.user_id).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert!(inbox[0].message.to_lowercase().contains("shipped"));
    assert!(inbox[0].message.contains("SHIPPED"));
    assert!(inbox[1].message.contains("ASSIGNED"));
    assert!(inbox[0].message.contains(&order.reference()));
}

#[tokio::test]
async fn test_illegal_transitions_are_rejected() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let shopper = caller(UserRole::User);
    let admin = caller(UserRole::Admin);
    let order = fx.service.create_order(&shopper, order_of(&sweet, 1)).await.unwrap();

    let skip = fx
        .service
        .update_status(&admin, order.id, status(OrderStatus::Delivered, None))
        .await;
    assert!(matches!(skip, Err(AppError::InvalidState(_))));

    fx.service
        .update_status(&admin, order.id, status(OrderStatus::Cancelled, None))
        .await
        .unwrap();

    let revive = fx
        .service
        .update_status(&admin, order.id, status(OrderStatus::Pending, None))
        .await;
    assert!(matches!(revive, Err(AppError::InvalidState(ref m)) if m.contains("no longer change")));

    // One notification for the cancellation only
    let inbox = fx.store.notifications_for_user(shopper.user_id).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].message.contains("CANCELLED"));
}

#[tokio::test]
async fn test_assignment_validates_partner() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let shopper = caller(UserRole::User);
    let admin = caller(UserRole::Admin);
    let order = fx.service.create_order(&shopper, order_of(&sweet, 1)).await.unwrap();

    let without = fx
        .service
        .update_status(&admin, order.id, status(OrderStatus::Assigned, None))
        .await;
    assert!(matches!(without, Err(AppError::Validation(_))));

    let unknown = fx
        .service
        .update_status(&admin, order.id, status(OrderStatus::Assigned, Some(Uuid::new_v4())))
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    let partner = seed_partner(&fx.store, "DP-54321").await;
    let terminated = fx.store.terminate_partner(partner.id).await.unwrap().unwrap();
    assert_eq!(terminated.status, PartnerStatus::Terminated);

    let inactive = fx
        .service
        .update_status(&admin, order.id, status(OrderStatus::Assigned, Some(partner.id)))
        .await;
    assert!(matches!(inactive, Err(AppError::InvalidState(_))));

    let unchanged = fx.store.find_order(order.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, OrderStatus::Pending);
    assert!(unchanged.delivery_partner_id.is_none());
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let fx = setup();
    let result = fx
        .service
        .update_status(&caller(UserRole::Admin), Uuid::new_v4(), status(OrderStatus::Cancelled, None))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_transition_survives_notification_failure() {
    let fx = setup();
    let sweet = seed_sweet(&fx.store, "Peda", 10, 10).await;
    let shopper = caller(UserRole::User);
    let order = fx.service.create_order(&shopper, order_of(&sweet, 1)).await.unwrap();

    fx.store.take_notifications_offline();
    let cancelled = fx
        .service
        .update_status(&caller(UserRole::Admin), order.id, status(OrderStatus::Cancelled, None))
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    let stored = fx.store.find_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Cancelled);
}
