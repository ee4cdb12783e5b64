//! # Error Types
//!
//! Domain-specific error types for crumb-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  crumb-core errors (this file)                                         │
//! │  └── CoreError        - Ledger, cart, and lifecycle rule violations    │
//! │                                                                         │
//! │  crumb-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  crumb-sync errors (separate crate)                                    │
//! │  └── SyncError        - Remote store unreachable, config, channels     │
//! │                                                                         │
//! │  Flow: CoreError ──► AppError ──► caller; SyncError is absorbed by     │
//! │  the gateway's local fallback wherever one exists                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (flavor, size, quantities, ids)
//! 3. Errors are enum variants, never String
//! 4. Validation errors abort before ANY mutation is applied

use thiserror::Error;

use crate::order::OrderStatus;
use crate::types::CookieSize;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent ledger or lifecycle rule violations. They are never
/// silently swallowed: a failing operation leaves all state untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A non-positive quantity was submitted to the ledger or cart.
    ///
    /// ## When This Occurs
    /// - `add_stock` / `deduct_stock` with quantity ≤ 0
    /// - Adding zero units or zero boxes to the cart
    #[error("{field} must be a positive quantity, got {value}")]
    InvalidQuantity { field: &'static str, value: i64 },

    /// A deduction would drive a (flavor, size) pool negative.
    ///
    /// ## When This Occurs
    /// - Delivering an order whose lines exceed current stock
    /// - A manual deduction beyond the aggregate level
    ///
    /// ## Guarantee
    /// The failing call performs no partial deduction; every batch and the
    /// movement log are left exactly as they were.
    #[error("insufficient stock for {flavor} ({size}): available {available}, requested {requested}")]
    InsufficientStock {
        flavor: String,
        size: CookieSize,
        available: i64,
        requested: i64,
    },

    /// A box selection does not sum exactly to the box capacity.
    ///
    /// An incomplete box must not be addable; the cart rejects the selection
    /// before any line is created.
    #[error("box selection holds {selected} of {capacity} cookies")]
    IncompleteBox { selected: i64, capacity: i64 },

    /// Checkout preconditions not met (empty cart or no customer selected).
    #[error("checkout not allowed: {reason}")]
    CheckoutNotAllowed { reason: String },

    /// A lifecycle move that skips a state, e.g. paying before delivery.
    ///
    /// The legacy flag-bag model allowed flags to be set in any order; the
    /// state machine rejects out-of-order moves instead.
    #[error("order {order_id} is {from}, cannot move to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Deleting a delivered order is refused: delivery already moved
    /// inventory and money, and those effects must not be silently undone.
    #[error("order {order_id} has been delivered and can no longer be deleted")]
    OrderNotDeletable { order_id: String },

    /// Cart line lookup failed.
    #[error("cart line not found: {line_id}")]
    LineNotFound { line_id: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            flavor: "Oreo".to_string(),
            size: CookieSize::Medium,
            available: 7,
            requested: 10,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Oreo (medium): available 7, requested 10"
        );
    }

    #[test]
    fn test_invalid_quantity_message() {
        let err = CoreError::InvalidQuantity {
            field: "quantity",
            value: -2,
        };
        assert_eq!(err.to_string(), "quantity must be a positive quantity, got -2");
    }

    #[test]
    fn test_incomplete_box_message() {
        let err = CoreError::IncompleteBox {
            selected: 3,
            capacity: 4,
        };
        assert_eq!(err.to_string(), "box selection holds 3 of 4 cookies");
    }
}
