//! # Finance Repository
//!
//! Database operations for income and expense records.
//!
//! Order-linked records (the income row written at payment) are removed
//! together with their order; manual records have no order_id and live
//! until deleted explicitly.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crumb_core::types::FinancialRecord;

/// Repository for financial records.
#[derive(Debug, Clone)]
pub struct FinanceRepository {
    pool: SqlitePool,
}

impl FinanceRepository {
    /// Creates a new FinanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FinanceRepository { pool }
    }

    /// Inserts a financial record.
    pub async fn insert(&self, record: &FinancialRecord) -> DbResult<()> {
        debug!(
            id = %record.id,
            category = %record.category,
            amount = %record.amount,
            "Inserting financial record"
        );

        sqlx::query(
            r#"
            INSERT INTO financial_records (
                id, kind, description, amount_cents, category, order_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&record.id)
        .bind(record.kind)
        .bind(&record.description)
        .bind(record.amount)
        .bind(&record.category)
        .bind(&record.order_id)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all records, newest first.
    pub async fn list(&self) -> DbResult<Vec<FinancialRecord>> {
        let records = sqlx::query_as::<_, FinancialRecord>(
            r#"
            SELECT id, kind, description, amount_cents AS amount,
                   category, order_id, created_at
            FROM financial_records
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Deletes every record referencing an order. Returns how many went.
    ///
    /// Called when an undelivered order is deleted, so no orphaned income
    /// rows survive it.
    pub async fn delete_for_order(&self, order_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM financial_records WHERE order_id = ?1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a single record by id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM financial_records WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("FinancialRecord", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crumb_core::types::RecordKind;
    use crumb_core::Money;

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let record = FinancialRecord::new(
            RecordKind::Income,
            "Sale to Maria (3 cookies)",
            Money::from_cents(13500),
            "Sales",
            Some("ord-1"),
        );
        db.finance().insert(&record).await.unwrap();

        let listed = db.finance().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].amount, Money::from_cents(13500));
        assert_eq!(listed[0].order_id.as_deref(), Some("ord-1"));
    }

    #[tokio::test]
    async fn test_delete_for_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let linked = FinancialRecord::new(
            RecordKind::Income,
            "Sale to Maria (3 cookies)",
            Money::from_cents(13500),
            "Sales",
            Some("ord-1"),
        );
        let manual = FinancialRecord::new(
            RecordKind::Expense,
            "Flour and butter",
            Money::from_cents(20000),
            "Supplies",
            None,
        );
        db.finance().insert(&linked).await.unwrap();
        db.finance().insert(&manual).await.unwrap();

        let removed = db.finance().delete_for_order("ord-1").await.unwrap();
        assert_eq!(removed, 1);

        // Manual records survive order deletion.
        let listed = db.finance().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, manual.id);
    }
}
