//! The active sale session.
//!
//! One cart, one optional selected customer. Checkout snapshots the cart
//! into a [`crumb_core::Sale`] and resets it; the selected customer
//! survives checkout so a shop assistant can ring up a follow-up order
//! without re-selecting.

use crumb_core::Cart;

/// The sale currently being built.
#[derive(Debug, Default)]
pub struct Session {
    pub cart: Cart,
    pub customer_id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}
