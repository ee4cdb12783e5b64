//! In-memory application state.
//!
//! One explicit state object holds everything the session works against:
//! the customer directory, the flavor catalog, the stock ledger, and the
//! sale/order/finance histories. There are no global singletons; the
//! service owns exactly one of these behind a lock.
//!
//! State is authoritative for the running session. The gateway mirrors
//! mutations into the durable store and [`AppState::apply_snapshot`]
//! replaces the whole object after a reload.

use crumb_core::order::{Order, Sale};
use crumb_core::types::{Customer, FinancialRecord, Flavor};
use crumb_core::StockLedger;
use crumb_sync::Snapshot;

/// Everything the application knows, in memory.
#[derive(Debug, Default)]
pub struct AppState {
    pub customers: Vec<Customer>,
    pub flavors: Vec<Flavor>,
    pub ledger: StockLedger,
    pub sales: Vec<Sale>,
    pub orders: Vec<Order>,
    pub records: Vec<FinancialRecord>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole state with a freshly loaded snapshot.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.customers = snapshot.customers;
        self.flavors = snapshot.flavors;
        self.ledger = StockLedger::from_parts(snapshot.stock_entries, snapshot.movements);
        self.sales = snapshot.sales;
        self.orders = snapshot.orders;
        self.records = snapshot.records;
    }

    /// Looks up a customer by id.
    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Looks up a customer by id, mutably.
    pub fn customer_mut(&mut self, id: &str) -> Option<&mut Customer> {
        self.customers.iter_mut().find(|c| c.id == id)
    }

    /// Position of an order in the history, if present.
    pub fn order_index(&self, id: &str) -> Option<usize> {
        self.orders.iter().position(|o| o.id == id)
    }
}
