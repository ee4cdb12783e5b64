//! # crumb-core: Pure Business Logic for Crumb
//!
//! This crate is the **heart** of Crumb, a small retail operations tool for
//! a cookie bakery. It contains the order and inventory ledger rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Crumb Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    crumb-app (Service Layer)                    │   │
//! │  │    Session cart ──► checkout ──► order lifecycle transitions    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ crumb-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   stock   │  │   cart    │  │   order   │  │   │
//! │  │   │ StockEntry│  │ StockLedger│ │   Cart    │  │ Sale/Order│  │   │
//! │  │   │ Movement  │  │ FIFO lots │  │ BoxSelect │  │ lifecycle │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              crumb-db / crumb-sync (Persistence)                │   │
//! │  │        SQLite repositories, remote-then-local gateway           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Flavor, StockEntry, SaleItem, Customer, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`stock`] - The inventory ledger: batches, FIFO depletion, movement log
//! - [`cart`] - The in-progress sale cart and box selection rules
//! - [`order`] - Sale snapshots and the order lifecycle state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Quantity validation shared by ledger and cart
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are integer cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use crumb_core::money::Money;
//! use crumb_core::stock::StockLedger;
//! use crumb_core::types::CookieSize;
//!
//! let mut ledger = StockLedger::new();
//! ledger.add_stock("Oreo", CookieSize::Medium, 10).unwrap();
//!
//! // FIFO deduction against the oldest batch first
//! ledger
//!     .deduct_stock("Oreo", CookieSize::Medium, 3, "order delivered", None)
//!     .unwrap();
//! assert_eq!(ledger.level("Oreo", CookieSize::Medium), 7);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod order;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use crumb_core::Money` instead of
// `use crumb_core::money::Money`

pub use cart::{BoxSelection, Cart};
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use order::{Order, OrderStatus, Sale, Transition};
pub use stock::{StockDeduction, StockLedger, StockReceipt};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable order sizes.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
