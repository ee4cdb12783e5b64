//! # Domain Types
//!
//! Core domain types used throughout Crumb.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StockEntry    │   │InventoryMovement│   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  flavor/size    │   │  flavor/size    │   │  flavor/size    │       │
//! │  │  quantity       │   │  signed qty     │   │  quantity       │       │
//! │  │  created_at     │   │  reason/order   │   │  price/total    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CookieSize    │   │    SaleType     │   │  MovementKind   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Medium         │   │  Unit           │   │  Addition       │       │
//! │  │  Large          │   │  Box4 / Box6    │   │  Deduction      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID v4 `id` generated client-side, so entities can be
//! created while the remote store is unreachable. Stock is keyed logically by
//! the (flavor, size) pair; several `StockEntry` rows may share one key, each
//! representing a separate receiving batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Cookie Size
// =============================================================================

/// Size of a cookie. The bakery only sells two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CookieSize {
    Medium,
    Large,
}

impl CookieSize {
    /// Stable string form used in reasons and log fields.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CookieSize::Medium => "medium",
            CookieSize::Large => "large",
        }
    }
}

impl std::fmt::Display for CookieSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Type
// =============================================================================

/// How a cart line is sold: loose units or a fixed-capacity box.
///
/// ## Unit Convention
/// For box lines, `SaleItem::quantity` counts **boxes**, never individual
/// cookies. The capacity lives here and the conversion to cookies happens at
/// every ledger and reporting boundary via [`SaleItem::cookie_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SaleType {
    /// Loose cookies, priced per unit.
    Unit,
    /// Box of four, priced per box.
    Box4,
    /// Box of six, priced per box.
    Box6,
}

impl SaleType {
    /// Number of cookies a box of this type holds; `None` for unit sales.
    pub const fn box_capacity(&self) -> Option<i64> {
        match self {
            SaleType::Unit => None,
            SaleType::Box4 => Some(4),
            SaleType::Box6 => Some(6),
        }
    }

    /// True for the box variants.
    pub const fn is_box(&self) -> bool {
        self.box_capacity().is_some()
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleType::Unit => "unit",
            SaleType::Box4 => "box4",
            SaleType::Box6 => "box6",
        }
    }
}

impl std::fmt::Display for SaleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Flavor
// =============================================================================

/// A cookie flavor in the catalog.
///
/// ## Derived Availability
/// Availability is NOT stored on the flavor. A flavor is available iff its
/// aggregate stock across sizes is > 0, computed by the stock ledger
/// (`StockLedger::is_available`). Storing it would let the two drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Flavor {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, also the logical stock key.
    pub name: String,

    /// When the flavor was added to the catalog.
    pub created_at: DateTime<Utc>,
}

impl Flavor {
    /// Creates a new catalog flavor with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Flavor {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Stock Entry (one receiving batch)
// =============================================================================

/// One receiving batch of stock for a (flavor, size) pool.
///
/// ## Batch Semantics
/// Multiple entries may exist for the same (flavor, size); each is a separate
/// lot and is depleted oldest-first (FIFO). Invariants:
/// - `quantity` ≥ 0 always
/// - entries that reach 0 are pruned from the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockEntry {
    pub id: String,
    pub flavor: String,
    pub size: CookieSize,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl StockEntry {
    /// Creates a new batch with a generated id and the current time.
    pub fn new(flavor: impl Into<String>, size: CookieSize, quantity: i64) -> Self {
        StockEntry {
            id: Uuid::new_v4().to_string(),
            flavor: flavor.into(),
            size,
            quantity,
            created_at: Utc::now(),
        }
    }

    /// True when this batch belongs to the given stock pool.
    pub fn matches(&self, flavor: &str, size: CookieSize) -> bool {
        self.flavor == flavor && self.size == size
    }
}

// =============================================================================
// Inventory Movement (append-only audit log)
// =============================================================================

/// Direction of an inventory movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Addition,
    Deduction,
}

impl MovementKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Addition => "addition",
            MovementKind::Deduction => "deduction",
        }
    }
}

/// Append-only audit record of a stock quantity change.
///
/// Never mutated or deleted once written. Every change to stock entry
/// quantities produces exactly one movement; a FIFO deduction that spans
/// several batches still logs a single movement for the full amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryMovement {
    pub id: String,
    pub flavor: String,
    pub size: CookieSize,
    /// Magnitude of the change; direction lives in `kind`.
    pub quantity: i64,
    pub kind: MovementKind,
    /// Human-readable reason, e.g. "added to inventory".
    pub reason: String,
    /// Order this movement traces back to, when lifecycle-triggered.
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryMovement {
    pub fn new(
        flavor: impl Into<String>,
        size: CookieSize,
        quantity: i64,
        kind: MovementKind,
        reason: impl Into<String>,
        order_id: Option<&str>,
    ) -> Self {
        InventoryMovement {
            id: Uuid::new_v4().to_string(),
            flavor: flavor.into(),
            size,
            quantity,
            kind,
            reason: reason.into(),
            order_id: order_id.map(str::to_owned),
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Sale Item (cart line and persisted line item)
// =============================================================================

/// A line item: one (flavor, size, sale type) at a locked-in price.
///
/// ## Snapshot Pattern
/// The price is frozen when the line is created. Sales and orders each carry
/// their own copy of the lines, so later catalog or schema changes never
/// rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub flavor: String,
    pub size: CookieSize,
    /// Units for `Unit` lines, boxes for `Box4`/`Box6` lines.
    pub quantity: i64,
    /// Price per unit or per box (frozen).
    pub unit_price: Money,
    /// Line total: `unit_price × quantity`.
    pub total: Money,
    pub sale_type: SaleType,
    /// Box capacity for box lines (4 or 6); `None` for unit lines.
    pub box_capacity: Option<i64>,
}

impl SaleItem {
    /// Creates a new line, computing the total and stamping capacity from
    /// the sale type.
    pub fn new(
        flavor: impl Into<String>,
        size: CookieSize,
        quantity: i64,
        unit_price: Money,
        sale_type: SaleType,
    ) -> Self {
        SaleItem {
            id: Uuid::new_v4().to_string(),
            flavor: flavor.into(),
            size,
            quantity,
            unit_price,
            total: unit_price * quantity,
            sale_type,
            box_capacity: sale_type.box_capacity(),
        }
    }

    /// Sets a new quantity and recomputes the frozen-price total.
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.total = self.unit_price * quantity;
    }

    /// Individual cookies this line represents.
    ///
    /// The boundary conversion: units pass through, boxes multiply by
    /// capacity. Ledger deductions and reports always work in cookies.
    pub fn cookie_count(&self) -> i64 {
        match self.box_capacity {
            Some(capacity) => self.quantity * capacity,
            None => self.quantity,
        }
    }

    /// The merge key: adding an item with a matching key increases the
    /// existing line's quantity instead of creating a duplicate row.
    pub fn merge_key(&self) -> (&str, CookieSize, SaleType) {
        (&self.flavor, self.size, self.sale_type)
    }
}

// =============================================================================
// Financial Record
// =============================================================================

/// Direction of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
        }
    }
}

/// A financial ledger entry.
///
/// Lifecycle-generated records (order payment income) are written only by
/// the order state machine and carry the order reference; manual entries
/// have no order reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FinancialRecord {
    pub id: String,
    pub kind: RecordKind,
    pub description: String,
    pub amount: Money,
    pub category: String,
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FinancialRecord {
    pub fn new(
        kind: RecordKind,
        description: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
        order_id: Option<&str>,
    ) -> Self {
        FinancialRecord {
            id: Uuid::new_v4().to_string(),
            kind,
            description: description.into(),
            amount,
            category: category.into(),
            order_id: order_id.map(str::to_owned),
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with lifetime purchase counters.
///
/// ## Counter Contract
/// The counters are updated exactly once per completed checkout by the order
/// state machine (never by profile CRUD), via [`CounterDelta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,

    /// Lifetime number of orders placed.
    pub order_count: i64,
    /// Lifetime loose cookies bought (unit lines only).
    pub total_cookies: i64,
    /// Lifetime boxes of four bought.
    pub box4_count: i64,
    /// Lifetime boxes of six bought.
    pub box6_count: i64,
}

impl Customer {
    /// Creates a new customer with zeroed counters.
    pub fn new(name: impl Into<String>) -> Self {
        Customer {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            created_at: Utc::now(),
            order_count: 0,
            total_cookies: 0,
            box4_count: 0,
            box6_count: 0,
        }
    }

    /// Applies a checkout's counter delta.
    pub fn apply_delta(&mut self, delta: &CounterDelta) {
        self.order_count += delta.orders;
        self.total_cookies += delta.units;
        self.box4_count += delta.box4;
        self.box6_count += delta.box6;
    }
}

/// The per-checkout increment to a customer's lifetime counters.
///
/// Computed from the cart at checkout: unit-line quantities feed `units`,
/// box-line quantities (in boxes) feed their own counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDelta {
    pub orders: i64,
    pub units: i64,
    pub box4: i64,
    pub box6: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
