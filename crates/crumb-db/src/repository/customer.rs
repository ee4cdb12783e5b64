//! # Customer Repository
//!
//! Database operations for the customer directory and its lifetime
//! purchase counters.
//!
//! ## Counter Contract
//! The counter columns (order_count, total_cookies, box4_count, box6_count)
//! are written ONLY by `apply_counters`, driven by checkout. Profile edits
//! go through `update_profile` and never touch them.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crumb_core::types::{CounterDelta, Customer};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone, address, created_at,
                order_count, total_cookies, box4_count, box6_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.created_at)
        .bind(customer.order_count)
        .bind(customer.total_cookies)
        .bind(customer.box4_count)
        .bind(customer.box6_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone, address, created_at,
                   order_count, total_cookies, box4_count, box6_count
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone, address, created_at,
                   order_count, total_cookies, box4_count, box6_count
            FROM customers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates a customer's contact details, leaving counters untouched.
    pub async fn update_profile(&self, customer: &Customer) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2, email = ?3, phone = ?4, address = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Applies a checkout's counter delta to a customer.
    pub async fn apply_counters(&self, id: &str, delta: &CounterDelta) -> DbResult<()> {
        debug!(id = %id, orders = delta.orders, "Applying customer counters");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                order_count   = order_count   + ?2,
                total_cookies = total_cookies + ?3,
                box4_count    = box4_count    + ?4,
                box6_count    = box6_count    + ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta.orders)
        .bind(delta.units)
        .bind(delta.box4)
        .bind(delta.box6)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Deletes a customer.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
