//! # Stock Ledger Module
//!
//! The inventory ledger: receiving batches, FIFO depletion, and the
//! append-only movement log.
//!
//! ## Ledger Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         StockLedger                                     │
//! │                                                                         │
//! │  entries: one row per receiving batch                                   │
//! │  ┌──────────────────────────────────────────────┐                       │
//! │  │ (Oreo, medium)  qty 5   received 10:00       │ ◄─ drained first      │
//! │  │ (Oreo, medium)  qty 3   received 11:30       │                       │
//! │  │ (Oreo, large)   qty 12  received 11:45       │                       │
//! │  └──────────────────────────────────────────────┘                       │
//! │                                                                         │
//! │  movements: append-only audit log                                       │
//! │  ┌──────────────────────────────────────────────┐                       │
//! │  │ +5 Oreo medium  "added to inventory"         │                       │
//! │  │ -6 Oreo medium  "order delivered - Maria"    │ ◄─ ONE row even when  │
//! │  └──────────────────────────────────────────────┘    two batches drain  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - No batch quantity is ever negative; batches that reach 0 are pruned
//! - Deductions drain the oldest batch first (FIFO)
//! - Every quantity change appends exactly one movement
//! - A failing deduction changes nothing: no batch, no movement

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::order::Order;
use crate::types::{CookieSize, InventoryMovement, MovementKind, StockEntry};
use crate::validation::validate_quantity;

/// Movement reason recorded for every receiving batch.
const REASON_ADDED: &str = "added to inventory";

// =============================================================================
// Operation Results
// =============================================================================

/// Result of receiving a batch: the new entry and its audit movement.
#[derive(Debug, Clone, PartialEq)]
pub struct StockReceipt {
    pub entry: StockEntry,
    pub movement: InventoryMovement,
}

/// Result of a FIFO deduction.
///
/// Carries everything a persistence layer needs to mirror the change:
/// the single audit movement, the ids of fully-drained batches, and the
/// partially-drained batch (if any) with its remaining quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct StockDeduction {
    pub movement: InventoryMovement,
    /// Batches emptied and pruned by this deduction, oldest first.
    pub drained: Vec<String>,
    /// The batch left partially filled, already at its new quantity.
    pub updated: Option<StockEntry>,
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// In-memory inventory ledger over receiving batches and movements.
///
/// Pure data structure: callers persist the returned receipts/deductions
/// however they like. The ledger itself never performs I/O.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockLedger {
    entries: Vec<StockEntry>,
    movements: Vec<InventoryMovement>,
}

impl StockLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted rows (e.g. at application load).
    pub fn from_parts(entries: Vec<StockEntry>, movements: Vec<InventoryMovement>) -> Self {
        StockLedger { entries, movements }
    }

    /// All receiving batches, in insertion order.
    pub fn entries(&self) -> &[StockEntry] {
        &self.entries
    }

    /// The full audit log, oldest first.
    pub fn movements(&self) -> &[InventoryMovement] {
        &self.movements
    }

    // =========================================================================
    // Levels
    // =========================================================================

    /// Aggregate quantity on hand for a (flavor, size) pool.
    pub fn level(&self, flavor: &str, size: CookieSize) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.matches(flavor, size))
            .map(|e| e.quantity)
            .sum()
    }

    /// True when at least one cookie of the pool is on hand.
    ///
    /// Flavor availability is derived from this, never stored as a flag.
    pub fn is_available(&self, flavor: &str, size: CookieSize) -> bool {
        self.level(flavor, size) > 0
    }

    /// True when any size of the flavor is on hand.
    pub fn is_flavor_available(&self, flavor: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.flavor == flavor && e.quantity > 0)
    }

    // =========================================================================
    // Additions
    // =========================================================================

    /// Receives a new batch into the ledger.
    ///
    /// Always creates a fresh batch row, even when one already exists for the
    /// pool; batch identity is what makes FIFO depletion meaningful.
    pub fn add_stock(
        &mut self,
        flavor: &str,
        size: CookieSize,
        quantity: i64,
    ) -> CoreResult<StockReceipt> {
        validate_quantity("quantity", quantity)?;

        let entry = StockEntry::new(flavor, size, quantity);
        let movement = InventoryMovement::new(
            flavor,
            size,
            quantity,
            MovementKind::Addition,
            REASON_ADDED,
            None,
        );

        self.entries.push(entry.clone());
        self.movements.push(movement.clone());

        Ok(StockReceipt { entry, movement })
    }

    /// Returns stock to the ledger as a brand-new batch.
    ///
    /// Restored cookies are the freshest lot and will be drained last, which
    /// keeps older batches moving first. The caller supplies the reason so the
    /// audit log says why the stock came back.
    pub fn restore_stock(
        &mut self,
        flavor: &str,
        size: CookieSize,
        quantity: i64,
        reason: &str,
        order_id: Option<&str>,
    ) -> CoreResult<StockReceipt> {
        validate_quantity("quantity", quantity)?;

        let entry = StockEntry::new(flavor, size, quantity);
        let movement = InventoryMovement::new(
            flavor,
            size,
            quantity,
            MovementKind::Addition,
            reason,
            order_id,
        );

        self.entries.push(entry.clone());
        self.movements.push(movement.clone());

        Ok(StockReceipt { entry, movement })
    }

    // =========================================================================
    // Deductions
    // =========================================================================

    /// Deducts a quantity from a pool, draining the oldest batch first.
    ///
    /// All-or-nothing: when the pool holds less than `quantity`, the call
    /// fails with [`CoreError::InsufficientStock`] and no batch or movement
    /// is touched. A successful deduction appends exactly ONE movement for
    /// the full amount regardless of how many batches it crossed.
    pub fn deduct_stock(
        &mut self,
        flavor: &str,
        size: CookieSize,
        quantity: i64,
        reason: &str,
        order_id: Option<&str>,
    ) -> CoreResult<StockDeduction> {
        validate_quantity("quantity", quantity)?;

        let available = self.level(flavor, size);
        if available < quantity {
            return Err(CoreError::InsufficientStock {
                flavor: flavor.to_string(),
                size,
                available,
                requested: quantity,
            });
        }

        // Matching batch indices, oldest receipt first.
        let mut batch_order: Vec<(usize, DateTime<Utc>)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(flavor, size))
            .map(|(i, e)| (i, e.created_at))
            .collect();
        batch_order.sort_by_key(|(_, created)| *created);

        let mut remaining = quantity;
        let mut drained = Vec::new();
        let mut updated = None;

        for (idx, _) in batch_order {
            if remaining == 0 {
                break;
            }
            let entry = &mut self.entries[idx];
            if entry.quantity <= remaining {
                remaining -= entry.quantity;
                entry.quantity = 0;
                drained.push(entry.id.clone());
            } else {
                entry.quantity -= remaining;
                remaining = 0;
                updated = Some(entry.clone());
            }
        }

        // Pruning keeps the batch list equal to what is actually on hand.
        self.entries.retain(|e| e.quantity > 0);

        let movement = InventoryMovement::new(
            flavor,
            size,
            quantity,
            MovementKind::Deduction,
            reason,
            order_id,
        );
        self.movements.push(movement.clone());

        Ok(StockDeduction {
            movement,
            drained,
            updated,
        })
    }

    /// Deducts every line of a delivered order, atomically.
    ///
    /// Box lines deduct their cookie count (boxes × capacity), unit lines
    /// their quantity. The whole order is simulated against current levels
    /// before anything is applied; if any line would come up short the call
    /// fails and the ledger is untouched.
    pub fn deduct_for_order(&mut self, order: &Order) -> CoreResult<Vec<StockDeduction>> {
        // Dry run against a scratch copy of the levels. Lines sharing a pool
        // compound, so the running level is what matters, not the opening one.
        let mut levels: Vec<(String, CookieSize, i64)> = Vec::new();
        for item in &order.items {
            let needed = item.cookie_count();
            let idx = match levels
                .iter()
                .position(|(f, s, _)| f == &item.flavor && *s == item.size)
            {
                Some(i) => i,
                None => {
                    let opening = self.level(&item.flavor, item.size);
                    levels.push((item.flavor.clone(), item.size, opening));
                    levels.len() - 1
                }
            };
            let level = levels[idx].2;
            if level < needed {
                return Err(CoreError::InsufficientStock {
                    flavor: item.flavor.clone(),
                    size: item.size,
                    available: level,
                    requested: needed,
                });
            }
            levels[idx].2 = level - needed;
        }

        let reason = format!("order delivered - {}", order.customer_name);
        let mut deductions = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let deduction = self.deduct_stock(
                &item.flavor,
                item.size,
                item.cookie_count(),
                &reason,
                Some(&order.id),
            )?;
            deductions.push(deduction);
        }
        Ok(deductions)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{SaleItem, SaleType};

    fn ledger_with(batches: &[(&str, CookieSize, i64)]) -> StockLedger {
        let mut ledger = StockLedger::new();
        for (flavor, size, qty) in batches {
            ledger.add_stock(flavor, *size, *qty).unwrap();
        }
        ledger
    }

    #[test]
    fn test_add_stock_creates_batch_and_movement() {
        let mut ledger = StockLedger::new();
        let receipt = ledger.add_stock("Oreo", CookieSize::Medium, 10).unwrap();

        assert_eq!(receipt.entry.quantity, 10);
        assert_eq!(receipt.movement.kind, MovementKind::Addition);
        assert_eq!(receipt.movement.reason, "added to inventory");
        assert_eq!(receipt.movement.order_id, None);
        assert_eq!(ledger.level("Oreo", CookieSize::Medium), 10);
        assert_eq!(ledger.movements().len(), 1);
    }

    #[test]
    fn test_add_stock_rejects_non_positive() {
        let mut ledger = StockLedger::new();
        assert!(ledger.add_stock("Oreo", CookieSize::Medium, 0).is_err());
        assert!(ledger.add_stock("Oreo", CookieSize::Medium, -4).is_err());
        assert!(ledger.entries().is_empty());
        assert!(ledger.movements().is_empty());
    }

    #[test]
    fn test_sizes_are_separate_pools() {
        let ledger = ledger_with(&[
            ("Oreo", CookieSize::Medium, 5),
            ("Oreo", CookieSize::Large, 8),
        ]);
        assert_eq!(ledger.level("Oreo", CookieSize::Medium), 5);
        assert_eq!(ledger.level("Oreo", CookieSize::Large), 8);
    }

    #[test]
    fn test_fifo_spans_batches_with_single_movement() {
        // Batches of 5 then 3; deducting 6 must empty the first batch and
        // leave 2 in the second, logging ONE movement of 6.
        let mut ledger = ledger_with(&[
            ("Oreo", CookieSize::Medium, 5),
            ("Oreo", CookieSize::Medium, 3),
        ]);
        let second_id = ledger.entries()[1].id.clone();

        let deduction = ledger
            .deduct_stock("Oreo", CookieSize::Medium, 6, "manual", None)
            .unwrap();

        assert_eq!(deduction.drained.len(), 1);
        let updated = deduction.updated.unwrap();
        assert_eq!(updated.id, second_id);
        assert_eq!(updated.quantity, 2);

        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.level("Oreo", CookieSize::Medium), 2);

        let deduction_rows: Vec<_> = ledger
            .movements()
            .iter()
            .filter(|m| m.kind == MovementKind::Deduction)
            .collect();
        assert_eq!(deduction_rows.len(), 1);
        assert_eq!(deduction_rows[0].quantity, 6);
    }

    #[test]
    fn test_exact_drain_prunes_batch() {
        let mut ledger = ledger_with(&[("Oreo", CookieSize::Medium, 5)]);
        let deduction = ledger
            .deduct_stock("Oreo", CookieSize::Medium, 5, "manual", None)
            .unwrap();

        assert_eq!(deduction.drained.len(), 1);
        assert!(deduction.updated.is_none());
        assert!(ledger.entries().is_empty());
        assert!(!ledger.is_available("Oreo", CookieSize::Medium));
    }

    #[test]
    fn test_insufficient_stock_is_a_no_op() {
        let mut ledger = ledger_with(&[("Oreo", CookieSize::Medium, 7)]);
        let before = ledger.clone();

        let err = ledger
            .deduct_stock("Oreo", CookieSize::Medium, 10, "manual", None)
            .unwrap_err();

        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 7);
                assert_eq!(requested, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_restore_stock_is_freshest_batch() {
        let mut ledger = ledger_with(&[("Oreo", CookieSize::Medium, 5)]);
        let receipt = ledger
            .restore_stock("Oreo", CookieSize::Medium, 3, "order cancelled", Some("ord-1"))
            .unwrap();

        assert_eq!(receipt.movement.kind, MovementKind::Addition);
        assert_eq!(receipt.movement.order_id.as_deref(), Some("ord-1"));
        assert_eq!(ledger.level("Oreo", CookieSize::Medium), 8);

        // The restored lot drains last: taking 5 leaves the restored 3.
        ledger
            .deduct_stock("Oreo", CookieSize::Medium, 5, "manual", None)
            .unwrap();
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.entries()[0].id, receipt.entry.id);
    }

    fn order_with_items(items: Vec<SaleItem>) -> Order {
        use crate::order::Sale;
        use chrono::Utc;
        use uuid::Uuid;

        let total = items.iter().map(|i| i.total).sum();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            customer_id: "cust-test".to_string(),
            customer_name: "Maria".to_string(),
            items,
            total,
            created_at: Utc::now(),
        };
        Order::from_sale(&sale)
    }

    #[test]
    fn test_deduct_for_order_is_atomic() {
        // Enough Oreo, not enough Red Velvet: nothing must change.
        let mut ledger = ledger_with(&[
            ("Oreo", CookieSize::Medium, 10),
            ("Red Velvet", CookieSize::Medium, 2),
        ]);
        let before = ledger.clone();

        let order = order_with_items(vec![
            SaleItem::new("Oreo", CookieSize::Medium, 3, Money::from_cents(4500), SaleType::Unit),
            SaleItem::new(
                "Red Velvet",
                CookieSize::Medium,
                5,
                Money::from_cents(4500),
                SaleType::Unit,
            ),
        ]);

        let err = ledger.deduct_for_order(&order).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_deduct_for_order_lines_sharing_a_pool_compound() {
        // Two lines on the same pool need 4 + 4 = 8; only 6 on hand.
        let mut ledger = ledger_with(&[("Oreo", CookieSize::Medium, 6)]);
        let before = ledger.clone();

        let order = order_with_items(vec![
            SaleItem::new("Oreo", CookieSize::Medium, 4, Money::from_cents(4500), SaleType::Unit),
            SaleItem::new("Oreo", CookieSize::Medium, 4, Money::from_cents(4500), SaleType::Unit),
        ]);

        let err = ledger.deduct_for_order(&order).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                // Second line sees the level AFTER the first line's dry run.
                assert_eq!(available, 2);
                assert_eq!(requested, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_deduct_for_order_box_lines_use_cookie_count() {
        let mut ledger = ledger_with(&[("Oreo", CookieSize::Medium, 10)]);

        let order = order_with_items(vec![SaleItem::new(
            "Oreo",
            CookieSize::Medium,
            2, // two boxes of four = 8 cookies
            Money::from_cents(16000),
            SaleType::Box4,
        )]);

        let deductions = ledger.deduct_for_order(&order).unwrap();
        assert_eq!(deductions.len(), 1);
        assert_eq!(deductions[0].movement.quantity, 8);
        assert_eq!(
            deductions[0].movement.reason,
            format!("order delivered - {}", order.customer_name)
        );
        assert_eq!(deductions[0].movement.order_id.as_deref(), Some(order.id.as_str()));
        assert_eq!(ledger.level("Oreo", CookieSize::Medium), 2);
    }
}
