//! # Order Module
//!
//! Sale snapshots and the order lifecycle state machine.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order State Machine                               │
//! │                                                                         │
//! │   checkout                                                              │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌─────────┐ prepare ┌──────────┐ deliver ┌───────────┐ pay ┌────────┐ │
//! │  │ Pending │────────►│ Prepared │────────►│ Delivered │────►│  Paid  │ │
//! │  └─────────┘         └──────────┘         └───────────┘     └────────┘ │
//! │      │                    │                     │                       │
//! │      └────── delete ──────┘              delete REFUSED once delivered  │
//! │                                                                         │
//! │  Side effects live with the transitions:                                │
//! │    deliver ──► inventory deduction (one logical unit per order)         │
//! │    pay     ──► one income FinancialRecord                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Rules
//! Transitions are strict: delivering a pending order or paying an
//! undelivered one fails with [`CoreError::InvalidTransition`]. Re-applying
//! a transition the order has already passed is a harmless no-op reported as
//! [`Transition::AlreadyDone`].
//!
//! The transition methods here only move the state; the side effects
//! (ledger deduction, financial record) are orchestrated by the service
//! layer around them so persistence failures can abort the move.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Customer, SaleItem};

// =============================================================================
// Order Status
// =============================================================================

/// Where an order sits in its lifecycle.
///
/// Derived from the transition timestamps, never stored separately, so the
/// two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Prepared,
    Delivered,
    Paid,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Prepared => "prepared",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a lifecycle transition.
///
/// `AlreadyDone` makes re-submission harmless: marking a delivered order
/// delivered again succeeds without re-firing any side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state moved and side effects should fire.
    Applied,
    /// The order was already at (or past) the requested state.
    AlreadyDone,
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable snapshot of a cart at checkout.
///
/// Sales are the historical record of what was sold at what price; they are
/// never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub items: Vec<SaleItem>,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Snapshots the cart for a customer.
    ///
    /// Fails with [`CoreError::CheckoutNotAllowed`] on an empty cart; the
    /// service layer additionally requires a selected customer before it
    /// gets here.
    pub fn from_cart(cart: &Cart, customer: &Customer) -> CoreResult<Sale> {
        if cart.is_empty() {
            return Err(CoreError::CheckoutNotAllowed {
                reason: "cart is empty".to_string(),
            });
        }

        Ok(Sale {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            items: cart.lines().to_vec(),
            total: cart.total(),
            created_at: Utc::now(),
        })
    }

    /// Individual cookies across all lines (boxes × capacity for box lines).
    pub fn cookie_count(&self) -> i64 {
        self.items.iter().map(SaleItem::cookie_count).sum()
    }
}

// =============================================================================
// Order
// =============================================================================

/// A fulfillable order created from a sale at checkout.
///
/// Carries its OWN copy of the line items: later changes to sales history
/// or the catalog never reach into an order being fulfilled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub sale_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub items: Vec<SaleItem>,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub prepared_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a pending order from a sale snapshot.
    ///
    /// Line items are copied with fresh ids so the order's rows are fully
    /// decoupled from the sale's.
    pub fn from_sale(sale: &Sale) -> Order {
        let items = sale
            .items
            .iter()
            .map(|item| SaleItem {
                id: Uuid::new_v4().to_string(),
                ..item.clone()
            })
            .collect();

        Order {
            id: Uuid::new_v4().to_string(),
            sale_id: sale.id.clone(),
            customer_id: sale.customer_id.clone(),
            customer_name: sale.customer_name.clone(),
            items,
            total: sale.total,
            created_at: sale.created_at,
            prepared_at: None,
            delivered_at: None,
            paid_at: None,
        }
    }

    /// Current lifecycle state, derived from the transition timestamps.
    pub fn status(&self) -> OrderStatus {
        if self.paid_at.is_some() {
            OrderStatus::Paid
        } else if self.delivered_at.is_some() {
            OrderStatus::Delivered
        } else if self.prepared_at.is_some() {
            OrderStatus::Prepared
        } else {
            OrderStatus::Pending
        }
    }

    /// Individual cookies across all lines.
    pub fn cookie_count(&self) -> i64 {
        self.items.iter().map(SaleItem::cookie_count).sum()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Marks the order prepared. No-op past Pending.
    pub fn prepare(&mut self, now: DateTime<Utc>) -> CoreResult<Transition> {
        match self.status() {
            OrderStatus::Pending => {
                self.prepared_at = Some(now);
                Ok(Transition::Applied)
            }
            _ => Ok(Transition::AlreadyDone),
        }
    }

    /// Marks the order delivered. Requires Prepared; no-op past Delivered.
    ///
    /// The caller deducts inventory BEFORE flipping the flag and only calls
    /// this once every line's deduction succeeded.
    pub fn deliver(&mut self, now: DateTime<Utc>) -> CoreResult<Transition> {
        match self.status() {
            OrderStatus::Prepared => {
                self.delivered_at = Some(now);
                Ok(Transition::Applied)
            }
            OrderStatus::Delivered | OrderStatus::Paid => Ok(Transition::AlreadyDone),
            from @ OrderStatus::Pending => Err(CoreError::InvalidTransition {
                order_id: self.id.clone(),
                from,
                to: OrderStatus::Delivered,
            }),
        }
    }

    /// Marks the order paid. Requires Delivered; no-op when already Paid.
    ///
    /// The caller emits the income record alongside this transition.
    pub fn pay(&mut self, now: DateTime<Utc>) -> CoreResult<Transition> {
        match self.status() {
            OrderStatus::Delivered => {
                self.paid_at = Some(now);
                Ok(Transition::Applied)
            }
            OrderStatus::Paid => Ok(Transition::AlreadyDone),
            from @ (OrderStatus::Pending | OrderStatus::Prepared) => {
                Err(CoreError::InvalidTransition {
                    order_id: self.id.clone(),
                    from,
                    to: OrderStatus::Paid,
                })
            }
        }
    }

    /// Checks whether the order may still be deleted.
    ///
    /// Delivery moved inventory and payment moved money; once delivered the
    /// order is part of history and deletion is refused.
    pub fn ensure_deletable(&self) -> CoreResult<()> {
        if self.delivered_at.is_some() {
            return Err(CoreError::OrderNotDeletable {
                order_id: self.id.clone(),
            });
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
    use crate::types::CookieSize;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_unit("Oreo", CookieSize::Medium, 3, Money::from_cents(4500))
            .unwrap();
        cart
    }

    fn pending_order() -> Order {
        let customer = Customer::new("Maria");
        let sale = Sale::from_cart(&sample_cart(), &customer).unwrap();
        Order::from_sale(&sale)
    }

    #[test]
    fn test_checkout_requires_non_empty_cart() {
        let customer = Customer::new("Maria");
        let err = Sale::from_cart(&Cart::new(), &customer).unwrap_err();
        assert!(matches!(err, CoreError::CheckoutNotAllowed { .. }));
    }

    #[test]
    fn test_sale_snapshots_cart() {
        let customer = Customer::new("Maria");
        let cart = sample_cart();
        let sale = Sale::from_cart(&cart, &customer).unwrap();

        assert_eq!(sale.customer_name, "Maria");
        assert_eq!(sale.total, Money::from_cents(13500));
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.cookie_count(), 3);
    }

    #[test]
    fn test_order_items_are_decoupled_copies() {
        let customer = Customer::new("Maria");
        let sale = Sale::from_cart(&sample_cart(), &customer).unwrap();
        let order = Order::from_sale(&sale);

        assert_eq!(order.sale_id, sale.id);
        assert_eq!(order.total, sale.total);
        assert_eq!(order.items.len(), sale.items.len());
        assert_ne!(order.items[0].id, sale.items[0].id);
        assert_eq!(order.items[0].flavor, sale.items[0].flavor);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut order = pending_order();
        assert_eq!(order.status(), OrderStatus::Pending);

        assert_eq!(order.prepare(Utc::now()).unwrap(), Transition::Applied);
        assert_eq!(order.status(), OrderStatus::Prepared);

        assert_eq!(order.deliver(Utc::now()).unwrap(), Transition::Applied);
        assert_eq!(order.status(), OrderStatus::Delivered);

        assert_eq!(order.pay(Utc::now()).unwrap(), Transition::Applied);
        assert_eq!(order.status(), OrderStatus::Paid);
    }

    #[test]
    fn test_transitions_are_idempotent() {
        let mut order = pending_order();
        order.prepare(Utc::now()).unwrap();
        let first_prepared = order.prepared_at;

        assert_eq!(order.prepare(Utc::now()).unwrap(), Transition::AlreadyDone);
        assert_eq!(order.prepared_at, first_prepared);

        order.deliver(Utc::now()).unwrap();
        assert_eq!(order.deliver(Utc::now()).unwrap(), Transition::AlreadyDone);

        order.pay(Utc::now()).unwrap();
        assert_eq!(order.pay(Utc::now()).unwrap(), Transition::AlreadyDone);
    }

    #[test]
    fn test_out_of_order_transitions_rejected() {
        let mut order = pending_order();

        // Delivering a pending order skips preparation.
        let err = order.deliver(Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
                ..
            }
        ));

        // Paying before delivery.
        let err = order.pay(Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                to: OrderStatus::Paid,
                ..
            }
        ));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn test_delete_refused_once_delivered() {
        let mut order = pending_order();
        assert!(order.ensure_deletable().is_ok());

        order.prepare(Utc::now()).unwrap();
        assert!(order.ensure_deletable().is_ok());

        order.deliver(Utc::now()).unwrap();
        assert!(matches!(
            order.ensure_deletable(),
            Err(CoreError::OrderNotDeletable { .. })
        ));
    }
}
