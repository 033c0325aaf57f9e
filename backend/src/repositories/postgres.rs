//! Postgres storage engine.
//!
//! Multi-row invariants rely on conditional updates inside a transaction:
//! a stock debit only matches a row that still has enough units, and a
//! status change only matches a row still in the expected state.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use sweetshop_shared::{
    OrderItemRequest, OrderStatus, SweetSearchQuery, UpdatePricingRequest, UserRole,
};
use uuid::Uuid;

use super::{
    restock_overflow, stock_error, CatalogRepository, NotificationRepository, OrderRepository,
    PartnerRepository, ReviewRepository, UserDirectory,
};
use crate::error::AppError;
use crate::models::sweet::{category_filter, search_text};
use crate::models::{DeliveryPartner, LineItem, Notification, Order, Review, Sweet, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load line items for a page of order rows, preserving row order
    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let items = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT order_id, sweet_id, name, quantity, price_at_purchase, cost_price_at_purchase
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for row in items {
            grouped.entry(row.order_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = grouped.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }

    async fn single_order(&self, row: Option<OrderRow>) -> Result<Option<Order>, AppError> {
        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    total_amount: Decimal,
    status: OrderStatus,
    delivery_partner_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<LineItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            items,
            total_amount: self.total_amount,
            status: self.status,
            delivery_partner_id: self.delivery_partner_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LineItemRow {
    order_id: Uuid,
    sweet_id: Uuid,
    name: String,
    quantity: i32,
    price_at_purchase: Decimal,
    cost_price_at_purchase: Decimal,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        Self {
            sweet_id: row.sweet_id,
            name: row.name,
            quantity: row.quantity,
            price_at_purchase: row.price_at_purchase,
            cost_price_at_purchase: row.cost_price_at_purchase,
        }
    }
}

#[async_trait]
impl CatalogRepository for PgStore {
    async fn list_sweets(&self) -> Result<Vec<Sweet>, AppError> {
        let sweets = sqlx::query_as::<_, Sweet>("SELECT * FROM sweets ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(sweets)
    }

    async fn search_sweets(&self, query: &SweetSearchQuery) -> Result<Vec<Sweet>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM sweets WHERE TRUE");

        if let Some(text) = search_text(query) {
            let pattern = format!("%{}%", text);
            builder
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = category_filter(query) {
            builder.push(" AND category = ").push_bind(category.to_string());
        }
        if let Some(min_price) = query.min_price {
            builder.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = query.max_price {
            builder.push(" AND price <= ").push_bind(max_price);
        }
        builder.push(" ORDER BY created_at DESC");

        let sweets = builder.build_query_as::<Sweet>().fetch_all(&self.pool).await?;
        Ok(sweets)
    }

    async fn find_sweet(&self, id: Uuid) -> Result<Option<Sweet>, AppError> {
        let sweet = sqlx::query_as::<_, Sweet>("SELECT * FROM sweets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sweet)
    }

    async fn find_sweets(&self, ids: &[Uuid]) -> Result<Vec<Sweet>, AppError> {
        let sweets = sqlx::query_as::<_, Sweet>("SELECT * FROM sweets WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(sweets)
    }

    async fn insert_sweet(&self, sweet: &Sweet) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sweets (
                id, name, category, price, cost_price, list_price, quantity, description,
                expiry_date, batch_number, image, average_rating, review_count, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(sweet.id)
        .bind(&sweet.name)
        .bind(&sweet.category)
        .bind(sweet.price)
        .bind(sweet.cost_price)
        .bind(sweet.list_price)
        .bind(sweet.quantity)
        .bind(&sweet.description)
        .bind(sweet.expiry_date)
        .bind(&sweet.batch_number)
        .bind(&sweet.image)
        .bind(sweet.average_rating)
        .bind(sweet.review_count)
        .bind(sweet.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_pricing(
        &self,
        id: Uuid,
        pricing: &UpdatePricingRequest,
    ) -> Result<Option<Sweet>, AppError> {
        let sweet = sqlx::query_as::<_, Sweet>(
            r#"
            UPDATE sweets
            SET price = COALESCE($1, price),
                cost_price = COALESCE($2, cost_price),
                list_price = COALESCE($3, list_price)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(pricing.price)
        .bind(pricing.cost_price)
        .bind(pricing.list_price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(sweet)
    }

    async fn restock(&self, id: Uuid, quantity: i32) -> Result<Option<Sweet>, AppError> {
        let sweet = sqlx::query_as::<_, Sweet>(
            "UPDATE sweets SET quantity = quantity + $1 \
             WHERE id = $2 AND quantity <= 2147483647 - $1 RETURNING *",
        )
        .bind(quantity)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match sweet {
            Some(sweet) => Ok(Some(sweet)),
            None => match self.find_sweet(id).await? {
                Some(existing) => Err(restock_overflow(&existing.name)),
                None => Ok(None),
            },
        }
    }

    async fn take_stock(&self, id: Uuid, quantity: i32) -> Result<Sweet, AppError> {
        let mut tx = self.pool.begin().await?;

        let debited = sqlx::query_as::<_, Sweet>(
            "UPDATE sweets SET quantity = quantity - $1 WHERE id = $2 AND quantity >= $1 RETURNING *",
        )
        .bind(quantity)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        match debited {
            Some(sweet) => {
                tx.commit().await?;
                Ok(sweet)
            }
            None => {
                let existing = sqlx::query_as::<_, Sweet>("SELECT * FROM sweets WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
                Err(stock_error(existing.as_ref(), id))
            }
        }
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn place_order(&self, user_id: Uuid, items: &[OrderItemRequest]) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut lines = Vec::with_capacity(items.len());

        for item in items {
            let debited = sqlx::query_as::<_, Sweet>(
                r#"
                UPDATE sweets
                SET quantity = quantity - $1
                WHERE id = $2 AND quantity >= $1
                RETURNING *
                "#,
            )
            .bind(item.quantity)
            .bind(item.sweet_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(sweet) = debited else {
                let existing = sqlx::query_as::<_, Sweet>("SELECT * FROM sweets WHERE id = $1")
                    .bind(item.sweet_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                // Dropping the transaction rolls back earlier debits.
                return Err(stock_error(existing.as_ref(), item.sweet_id));
            };

            lines.push(LineItem::snapshot(&sweet, item.quantity));
        }

        let order = Order::place(user_id, lines)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, total_amount, status, delivery_partner_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(order.delivery_partner_id)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, position, sweet_id, name, quantity,
                    price_at_purchase, cost_price_at_purchase
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(order.id)
            .bind(position as i32)
            .bind(line.sweet_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.price_at_purchase)
            .bind(line.cost_price_at_purchase)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.single_order(row).await
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_items(rows).await
    }

    async fn all_orders(&self) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        self.attach_items(rows).await
    }

    async fn orders_for_partner(&self, partner_id: Uuid) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE delivery_partner_id = $1 ORDER BY created_at DESC",
        )
        .bind(partner_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_items(rows).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        status: OrderStatus,
        partner_id: Option<Uuid>,
    ) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE orders
            SET status = $1,
                delivery_partner_id = COALESCE($2, delivery_partner_id)
            WHERE id = $3 AND status = $4
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(partner_id)
        .bind(id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;
        self.single_order(row).await
    }
}

#[async_trait]
impl PartnerRepository for PgStore {
    async fn insert_partner(&self, partner: &DeliveryPartner) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO delivery_partners (id, name, code, mobile, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(partner.id)
        .bind(&partner.name)
        .bind(&partner.code)
        .bind(&partner.mobile)
        .bind(partner.status)
        .bind(partner.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Partner code {} already in use", partner.code))
            }
            other => AppError::Database(other),
        })?;
        Ok(())
    }

    async fn find_partner(&self, id: Uuid) -> Result<Option<DeliveryPartner>, AppError> {
        let partner =
            sqlx::query_as::<_, DeliveryPartner>("SELECT * FROM delivery_partners WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(partner)
    }

    async fn find_partner_by_credentials(
        &self,
        name: &str,
        code: &str,
    ) -> Result<Option<DeliveryPartner>, AppError> {
        let partner = sqlx::query_as::<_, DeliveryPartner>(
            "SELECT * FROM delivery_partners WHERE name = $1 AND code = $2",
        )
        .bind(name)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(partner)
    }

    async fn list_partners(&self) -> Result<Vec<DeliveryPartner>, AppError> {
        let partners = sqlx::query_as::<_, DeliveryPartner>(
            "SELECT * FROM delivery_partners ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(partners)
    }

    async fn terminate_partner(&self, id: Uuid) -> Result<Option<DeliveryPartner>, AppError> {
        let partner = sqlx::query_as::<_, DeliveryPartner>(
            "UPDATE delivery_partners SET status = 'terminated' WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(partner)
    }
}

#[async_trait]
impl NotificationRepository for PgStore {
    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, message, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.message)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_notification(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(notification)
    }

    async fn notifications_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(notification)
    }
}

#[async_trait]
impl ReviewRepository for PgStore {
    async fn insert_review(&self, review: &Review) -> Result<Sweet, AppError> {
        let mut tx = self.pool.begin().await?;

        let sweet = sqlx::query_as::<_, Sweet>(
            r#"
            UPDATE sweets
            SET average_rating = (average_rating * review_count + $1) / (review_count + 1),
                review_count = review_count + 1
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(f64::from(review.rating))
        .bind(review.sweet_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sweet not found".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO reviews (id, sweet_id, user_id, username, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(review.id)
        .bind(review.sweet_id)
        .bind(review.user_id)
        .bind(&review.username)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(sweet)
    }

    async fn reviews_for_sweet(&self, sweet_id: Uuid) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE sweet_id = $1 ORDER BY created_at DESC",
        )
        .bind(sweet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn record_user(&self, user: &User) -> Result<User, AppError> {
        let stored = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, mobile, address, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.mobile)
        .bind(&user.address)
        .bind(user.role)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn update_contact(
        &self,
        id: Uuid,
        mobile: Option<&str>,
        address: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET mobile = COALESCE($2, mobile),
                address = COALESCE($3, address)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(mobile)
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("UPDATE users SET role = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
