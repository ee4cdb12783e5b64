//! # Remote Store
//!
//! The persistence interface the gateway writes through, and its SQLite
//! implementation.
//!
//! ## Why a Trait?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RemoteStore Seam                                  │
//! │                                                                         │
//! │  Gateway ──► dyn-free generic S: RemoteStore                            │
//! │                 │                                                       │
//! │                 ├── SqliteStore (production, over crumb-db)             │
//! │                 └── test doubles that fail on demand, so the local      │
//! │                     fallback path is testable without killing a DB      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use tracing::debug;

use crumb_core::order::{Order, Sale};
use crumb_core::stock::{StockDeduction, StockReceipt};
use crumb_core::types::{
    CounterDelta, Customer, FinancialRecord, Flavor, InventoryMovement, StockEntry,
};
use crumb_db::Database;

use crate::error::SyncResult;

/// How many movement rows a snapshot carries back into memory.
const MOVEMENT_HISTORY_LIMIT: i64 = 1000;

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the application loads at startup or reload.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub customers: Vec<Customer>,
    pub flavors: Vec<Flavor>,
    pub stock_entries: Vec<StockEntry>,
    pub movements: Vec<InventoryMovement>,
    pub sales: Vec<Sale>,
    pub orders: Vec<Order>,
    pub records: Vec<FinancialRecord>,
}

// =============================================================================
// Remote Store Trait
// =============================================================================

/// The durable store behind the gateway.
///
/// Every method is a single logical write (or the full read); atomicity
/// within a method is the implementation's responsibility.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Cheap reachability check.
    async fn ping(&self) -> SyncResult<()>;

    /// Loads the complete application snapshot.
    async fn load_all(&self) -> SyncResult<Snapshot>;

    async fn save_customer(&self, customer: &Customer) -> SyncResult<()>;
    async fn apply_counters(&self, customer_id: &str, delta: &CounterDelta) -> SyncResult<()>;

    async fn save_flavor(&self, flavor: &Flavor) -> SyncResult<()>;

    async fn apply_receipt(&self, receipt: &StockReceipt) -> SyncResult<()>;
    async fn apply_deduction(&self, deduction: &StockDeduction) -> SyncResult<()>;

    async fn save_sale(&self, sale: &Sale) -> SyncResult<()>;

    async fn save_order(&self, order: &Order) -> SyncResult<()>;
    async fn update_order(&self, order: &Order) -> SyncResult<()>;
    async fn delete_order(&self, order_id: &str) -> SyncResult<()>;

    async fn save_record(&self, record: &FinancialRecord) -> SyncResult<()>;
    async fn delete_record(&self, record_id: &str) -> SyncResult<()>;
    async fn delete_records_for_order(&self, order_id: &str) -> SyncResult<u64>;
}

// =============================================================================
// SQLite Implementation
// =============================================================================

/// Production store over the crumb-db repositories.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wraps an open database handle.
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    /// The underlying database, for shutdown.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn ping(&self) -> SyncResult<()> {
        if self.db.health_check().await {
            Ok(())
        } else {
            Err(crate::error::SyncError::RemoteUnavailable(
                "health check failed".into(),
            ))
        }
    }

    async fn load_all(&self) -> SyncResult<Snapshot> {
        debug!("Loading full snapshot");
        let customers_repo = self.db.customers();
        let flavors_repo = self.db.flavors();
        let stock_repo = self.db.stock();
        let sales_repo = self.db.sales();
        let orders_repo = self.db.orders();
        let finance_repo = self.db.finance();
        let (customers, flavors, stock_entries, movements, sales, orders, records) = tokio::join!(
            customers_repo.list(),
            flavors_repo.list(),
            stock_repo.list_entries(),
            stock_repo.list_movements(MOVEMENT_HISTORY_LIMIT),
            sales_repo.list(),
            orders_repo.list(),
            finance_repo.list(),
        );
        Ok(Snapshot {
            customers: customers?,
            flavors: flavors?,
            stock_entries: stock_entries?,
            movements: movements?,
            sales: sales?,
            orders: orders?,
            records: records?,
        })
    }

    async fn save_customer(&self, customer: &Customer) -> SyncResult<()> {
        self.db.customers().insert(customer).await?;
        Ok(())
    }

    async fn apply_counters(&self, customer_id: &str, delta: &CounterDelta) -> SyncResult<()> {
        self.db.customers().apply_counters(customer_id, delta).await?;
        Ok(())
    }

    async fn save_flavor(&self, flavor: &Flavor) -> SyncResult<()> {
        self.db.flavors().insert(flavor).await?;
        Ok(())
    }

    async fn apply_receipt(&self, receipt: &StockReceipt) -> SyncResult<()> {
        self.db.stock().apply_receipt(receipt).await?;
        Ok(())
    }

    async fn apply_deduction(&self, deduction: &StockDeduction) -> SyncResult<()> {
        self.db.stock().apply_deduction(deduction).await?;
        Ok(())
    }

    async fn save_sale(&self, sale: &Sale) -> SyncResult<()> {
        self.db.sales().insert(sale).await?;
        Ok(())
    }

    async fn save_order(&self, order: &Order) -> SyncResult<()> {
        self.db.orders().insert(order).await?;
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> SyncResult<()> {
        self.db.orders().update_timestamps(order).await?;
        Ok(())
    }

    async fn delete_order(&self, order_id: &str) -> SyncResult<()> {
        self.db.orders().delete(order_id).await?;
        Ok(())
    }

    async fn save_record(&self, record: &FinancialRecord) -> SyncResult<()> {
        self.db.finance().insert(record).await?;
        Ok(())
    }

    async fn delete_record(&self, record_id: &str) -> SyncResult<()> {
        self.db.finance().delete(record_id).await?;
        Ok(())
    }

    async fn delete_records_for_order(&self, order_id: &str) -> SyncResult<u64> {
        Ok(self.db.finance().delete_for_order(order_id).await?)
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::SyncError;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store double whose operations fail while `down` is set.
    #[derive(Default)]
    pub(crate) struct ToggleStore {
        pub(crate) down: AtomicBool,
    }

    impl ToggleStore {
        pub(crate) fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::Release);
        }

        fn check(&self) -> SyncResult<()> {
            if self.down.load(Ordering::Acquire) {
                Err(SyncError::RemoteUnavailable("store is down".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RemoteStore for ToggleStore {
        async fn ping(&self) -> SyncResult<()> {
            self.check()
        }
        async fn load_all(&self) -> SyncResult<Snapshot> {
            self.check()?;
            Ok(Snapshot::default())
        }
        async fn save_customer(&self, _: &Customer) -> SyncResult<()> {
            self.check()
        }
        async fn apply_counters(&self, _: &str, _: &CounterDelta) -> SyncResult<()> {
            self.check()
        }
        async fn save_flavor(&self, _: &Flavor) -> SyncResult<()> {
            self.check()
        }
        async fn apply_receipt(&self, _: &StockReceipt) -> SyncResult<()> {
            self.check()
        }
        async fn apply_deduction(&self, _: &StockDeduction) -> SyncResult<()> {
            self.check()
        }
        async fn save_sale(&self, _: &Sale) -> SyncResult<()> {
            self.check()
        }
        async fn save_order(&self, _: &Order) -> SyncResult<()> {
            self.check()
        }
        async fn update_order(&self, _: &Order) -> SyncResult<()> {
            self.check()
        }
        async fn delete_order(&self, _: &str) -> SyncResult<()> {
            self.check()
        }
        async fn save_record(&self, _: &FinancialRecord) -> SyncResult<()> {
            self.check()
        }
        async fn delete_record(&self, _: &str) -> SyncResult<()> {
            self.check()
        }
        async fn delete_records_for_order(&self, _: &str) -> SyncResult<u64> {
            self.check()?;
            Ok(0)
        }
    }
}
