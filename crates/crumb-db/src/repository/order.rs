//! # Order Repository
//!
//! Database operations for orders and their decoupled line items.
//!
//! ## Lifecycle Persistence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Persistence                                  │
//! │                                                                         │
//! │  checkout ──► insert()            order + items, one transaction        │
//! │  prepare/deliver/pay ──► update_timestamps()   the three flag columns   │
//! │  delete ──► delete()              items cascade via foreign key         │
//! │                                                                         │
//! │  list() returns newest-created first; status changes never reorder      │
//! │  because the sort key is created_at, which is immutable.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crumb_core::order::Order;
use crumb_core::types::SaleItem;
use crumb_core::Money;

/// Internal row shape for the orders table; items are loaded separately.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    sale_id: String,
    customer_id: String,
    customer_name: String,
    total: Money,
    created_at: DateTime<Utc>,
    prepared_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order and its items atomically.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, customer = %order.customer_name, "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, sale_id, customer_id, customer_name, total_cents,
                created_at, prepared_at, delivered_at, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.sale_id)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(order.total)
        .bind(order.created_at)
        .bind(order.prepared_at)
        .bind(order.delivered_at)
        .bind(order.paid_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, flavor, size, quantity,
                    unit_price_cents, total_cents, sale_type, box_capacity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&order.id)
            .bind(&item.flavor)
            .bind(item.size)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total)
            .bind(item.sale_type)
            .bind(item.box_capacity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, sale_id, customer_id, customer_name,
                   total_cents AS total, created_at,
                   prepared_at, delivered_at, paid_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.items_for(&row.id).await?;
                Ok(Some(assemble(row, items)))
            }
            None => Ok(None),
        }
    }

    /// Lists all orders with items, most recently created first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, sale_id, customer_id, customer_name,
                   total_cents AS total, created_at,
                   prepared_at, delivered_at, paid_at
            FROM orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.items_for(&row.id).await?;
            orders.push(assemble(row, items));
        }
        Ok(orders)
    }

    /// Writes an order's transition timestamps after a lifecycle move.
    pub async fn update_timestamps(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, status = %order.status(), "Updating order timestamps");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                prepared_at = ?2, delivered_at = ?3, paid_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&order.id)
        .bind(order.prepared_at)
        .bind(order.delivered_at)
        .bind(order.paid_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", &order.id));
        }

        Ok(())
    }

    /// Deletes an order; its items cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    async fn items_for(&self, order_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, flavor, size, quantity,
                   unit_price_cents AS unit_price, total_cents AS total,
                   sale_type, box_capacity
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

fn assemble(row: OrderRow, items: Vec<SaleItem>) -> Order {
    Order {
        id: row.id,
        sale_id: row.sale_id,
        customer_id: row.customer_id,
        customer_name: row.customer_name,
        items,
        total: row.total,
        created_at: row.created_at,
        prepared_at: row.prepared_at,
        delivered_at: row.delivered_at,
        paid_at: row.paid_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crumb_core::cart::Cart;
    use crumb_core::order::{OrderStatus, Sale};
    use crumb_core::types::{CookieSize, Customer};

    async fn sample_order(db: &Database, flavor: &str) -> Order {
        let mut cart = Cart::new();
        cart.add_unit(flavor, CookieSize::Medium, 2, Money::from_cents(4500))
            .unwrap();
        let sale = Sale::from_cart(&cart, &Customer::new("Maria")).unwrap();
        let order = Order::from_sale(&sale);
        db.orders().insert(&order).await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_insert_and_reload() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = sample_order(&db, "Oreo").await;

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status(), OrderStatus::Pending);
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.total, Money::from_cents(9000));
    }

    #[tokio::test]
    async fn test_timestamps_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut order = sample_order(&db, "Oreo").await;

        order.prepare(Utc::now()).unwrap();
        db.orders().update_timestamps(&order).await.unwrap();

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status(), OrderStatus::Prepared);
        assert!(loaded.delivered_at.is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let _first = sample_order(&db, "Oreo").await;
        // Created later, must list first.
        let second = sample_order(&db, "Red Velvet").await;

        let listed = db.orders().list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = sample_order(&db, "Oreo").await;

        db.orders().delete(&order.id).await.unwrap();
        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
