//! # Sale Repository
//!
//! Database operations for checkout snapshots.
//!
//! ## Snapshot Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Persistence                                  │
//! │                                                                         │
//! │  checkout ──► Sale { items, total, customer }                           │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  insert() writes the sale row AND its item rows in one transaction;     │
//! │  sales are never updated afterwards — they ARE the history.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crumb_core::order::Sale;
use crumb_core::types::SaleItem;
use crumb_core::Money;

/// Internal row shape for the sales table; items are loaded separately.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    customer_id: String,
    customer_name: String,
    total: Money,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// Repository for sale snapshots.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale and its items atomically.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, customer = %sale.customer_name, "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, customer_id, customer_name, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.customer_id)
        .bind(&sale.customer_name)
        .bind(sale.total)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for item in &sale.items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, flavor, size, quantity,
                    unit_price_cents, total_cents, sale_type, box_capacity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&sale.id)
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

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, customer_id, customer_name, total_cents AS total, created_at
            FROM sales
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

    /// Lists all sales with their items, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, customer_id, customer_name, total_cents AS total, created_at
            FROM sales
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.items_for(&row.id).await?;
            sales.push(assemble(row, items));
        }
        Ok(sales)
    }

    async fn items_for(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, flavor, size, quantity,
                   unit_price_cents AS unit_price, total_cents AS total,
                   sale_type, box_capacity
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

fn assemble(row: SaleRow, items: Vec<SaleItem>) -> Sale {
    Sale {
        id: row.id,
        customer_id: row.customer_id,
        customer_name: row.customer_name,
        items,
        total: row.total,
        created_at: row.created_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
