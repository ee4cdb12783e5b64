//! # Stock Repository
//!
//! Database operations for stock batches and the inventory movement log.
//!
//! ## Mirroring the Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  crumb-core StockLedger (in memory)          crumb-db (durable)         │
//! │                                                                         │
//! │  add_stock() ──► StockReceipt ──────────────► apply_receipt()           │
//! │  deduct_stock() ──► StockDeduction ─────────► apply_deduction()         │
//! │                                                                         │
//! │  The ledger computes WHAT changed; this repository persists it in one   │
//! │  transaction so the durable state can never hold half a deduction.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crumb_core::stock::{StockDeduction, StockReceipt};
use crumb_core::types::{InventoryMovement, StockEntry};

/// Repository for stock batches and movements.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Lists all live batches, oldest first.
    pub async fn list_entries(&self) -> DbResult<Vec<StockEntry>> {
        let entries = sqlx::query_as::<_, StockEntry>(
            r#"
            SELECT id, flavor, size, quantity, created_at
            FROM stock_entries
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists movements, newest first, up to `limit` rows.
    pub async fn list_movements(&self, limit: i64) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(
            r#"
            SELECT id, flavor, size, quantity, kind, reason, order_id, created_at
            FROM inventory_movements
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Persists a receiving: the new batch and its movement, atomically.
    pub async fn apply_receipt(&self, receipt: &StockReceipt) -> DbResult<()> {
        debug!(
            flavor = %receipt.entry.flavor,
            quantity = receipt.entry.quantity,
            "Persisting stock receipt"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO stock_entries (id, flavor, size, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&receipt.entry.id)
        .bind(&receipt.entry.flavor)
        .bind(receipt.entry.size)
        .bind(receipt.entry.quantity)
        .bind(receipt.entry.created_at)
        .execute(&mut *tx)
        .await?;

        insert_movement(&mut tx, &receipt.movement).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Persists a FIFO deduction: drained batches go away, the partially
    /// drained one gets its new quantity, and the single movement lands,
    /// all in one transaction.
    pub async fn apply_deduction(&self, deduction: &StockDeduction) -> DbResult<()> {
        debug!(
            flavor = %deduction.movement.flavor,
            quantity = deduction.movement.quantity,
            drained = deduction.drained.len(),
            "Persisting stock deduction"
        );

        let mut tx = self.pool.begin().await?;

        for entry_id in &deduction.drained {
            sqlx::query("DELETE FROM stock_entries WHERE id = ?1")
                .bind(entry_id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(updated) = &deduction.updated {
            sqlx::query("UPDATE stock_entries SET quantity = ?2 WHERE id = ?1")
                .bind(&updated.id)
                .bind(updated.quantity)
                .execute(&mut *tx)
                .await?;
        }

        insert_movement(&mut tx, &deduction.movement).await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Inserts a movement row inside an open transaction.
async fn insert_movement(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    movement: &InventoryMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_movements (
            id, flavor, size, quantity, kind, reason, order_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.flavor)
    .bind(movement.size)
    .bind(movement.quantity)
    .bind(movement.kind)
    .bind(&movement.reason)
    .bind(&movement.order_id)
    .bind(movement.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crumb_core::stock::StockLedger;
    use crumb_core::types::CookieSize;

    #[tokio::test]
    async fn test_receipt_and_deduction_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stock();

        // Drive the in-memory ledger and mirror each change.
        let mut ledger = StockLedger::new();
        let first = ledger.add_stock("Oreo", CookieSize::Medium, 5).unwrap();
        let second = ledger.add_stock("Oreo", CookieSize::Medium, 3).unwrap();
        repo.apply_receipt(&first).await.unwrap();
        repo.apply_receipt(&second).await.unwrap();

        let deduction = ledger
            .deduct_stock("Oreo", CookieSize::Medium, 6, "manual", None)
            .unwrap();
        repo.apply_deduction(&deduction).await.unwrap();

        // Durable state matches the ledger: one batch of 2 remains.
        let entries = repo.list_entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 2);

        let movements = repo.list_movements(10).await.unwrap();
        assert_eq!(movements.len(), 3);
    }

    #[tokio::test]
    async fn test_rebuild_ledger_from_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stock();

        let mut ledger = StockLedger::new();
        let receipt = ledger.add_stock("Red Velvet", CookieSize::Large, 4).unwrap();
        repo.apply_receipt(&receipt).await.unwrap();

        let rebuilt = StockLedger::from_parts(
            repo.list_entries().await.unwrap(),
            repo.list_movements(1000).await.unwrap(),
        );
        assert_eq!(rebuilt.level("Red Velvet", CookieSize::Large), 4);
    }
}
