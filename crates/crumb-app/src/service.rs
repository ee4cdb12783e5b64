//! # Application Service
//!
//! The orchestration layer: every user-facing operation enters here, runs
//! through the pure core logic, and is mirrored into the durable store via
//! the gateway.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       AppService Operation                              │
//! │                                                                         │
//! │  1. lock the state (and/or session)                                     │
//! │  2. run the pure core operation (may fail; state untouched on error)    │
//! │  3. mirror the result through the gateway (never fails; may fall back)  │
//! │  4. commit the mutation to in-memory state                              │
//! │                                                                         │
//! │  Order matters in step 2-4: the core validates BEFORE anything is       │
//! │  persisted, and state is committed whether or not the store was         │
//! │  reachable. The session keeps working offline.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle Transitions
//! Transitions clone the order, stamp the clone, run side effects, and only
//! then swap the clone in. A failed side effect (say, insufficient stock at
//! delivery) leaves both the order and the ledger exactly as they were.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crumb_core::cart::BoxSelection;
use crumb_core::order::{Order, Sale};
use crumb_core::types::{
    CookieSize, Customer, FinancialRecord, Flavor, InventoryMovement, RecordKind, SaleItem,
    StockEntry,
};
use crumb_core::{CoreError, Money, Transition};
use crumb_sync::{Gateway, ProbeEvent, RemoteStore};

use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::state::AppState;

/// Category assigned to lifecycle-generated income records.
const SALES_CATEGORY: &str = "Sales";

// =============================================================================
// Service
// =============================================================================

/// The application service: state, session, and gateway in one place.
pub struct AppService<S> {
    state: RwLock<AppState>,
    session: Mutex<Session>,
    gateway: Arc<Gateway<S>>,
    /// Set while a checkout is being finalized; the double-submission guard.
    checkout_in_flight: AtomicBool,
}

impl<S: RemoteStore> AppService<S> {
    /// Creates a service with empty state over the given gateway.
    ///
    /// Call [`reload`](Self::reload) afterwards to hydrate from the store.
    pub fn new(gateway: Arc<Gateway<S>>) -> Self {
        AppService {
            state: RwLock::new(AppState::new()),
            session: Mutex::new(Session::new()),
            gateway,
            checkout_in_flight: AtomicBool::new(false),
        }
    }

    /// The persistence gateway, for wiring up the probe.
    pub fn gateway(&self) -> &Arc<Gateway<S>> {
        &self.gateway
    }

    // =========================================================================
    // Snapshot Loading
    // =========================================================================

    /// Replaces in-memory state with the store's snapshot.
    ///
    /// Returns `false` when another reload was already in flight and this
    /// call coalesced into it.
    pub async fn reload(&self) -> AppResult<bool> {
        match self.gateway.load_all().await? {
            Some(snapshot) => {
                let mut state = self.state.write().await;
                state.apply_snapshot(snapshot);
                info!(
                    customers = state.customers.len(),
                    orders = state.orders.len(),
                    "State reloaded from store"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reacts to a connectivity probe event.
    pub async fn on_probe_event(&self, event: ProbeEvent) -> AppResult<bool> {
        match event {
            ProbeEvent::CameOnline => self.reload().await,
        }
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Receives a new batch of cookies into stock.
    pub async fn add_stock(
        &self,
        flavor: &str,
        size: CookieSize,
        quantity: i64,
    ) -> AppResult<StockEntry> {
        let mut state = self.state.write().await;
        let receipt = state.ledger.add_stock(flavor, size, quantity)?;

        self.gateway
            .write("apply_receipt", self.gateway.store().apply_receipt(&receipt))
            .await;

        Ok(receipt.entry)
    }

    /// Returns cookies to stock as a fresh batch, with an audit reason.
    pub async fn restore_stock(
        &self,
        flavor: &str,
        size: CookieSize,
        quantity: i64,
        reason: &str,
        order_id: Option<&str>,
    ) -> AppResult<StockEntry> {
        let mut state = self.state.write().await;
        let receipt = state
            .ledger
            .restore_stock(flavor, size, quantity, reason, order_id)?;

        self.gateway
            .write("apply_receipt", self.gateway.store().apply_receipt(&receipt))
            .await;

        Ok(receipt.entry)
    }

    /// Current aggregate quantity for a (flavor, size) pool.
    pub async fn stock_level(&self, flavor: &str, size: CookieSize) -> i64 {
        self.state.read().await.ledger.level(flavor, size)
    }

    /// Whether any size of the flavor is in stock.
    pub async fn is_flavor_available(&self, flavor: &str) -> bool {
        self.state.read().await.ledger.is_flavor_available(flavor)
    }

    /// The movement audit log, oldest first.
    pub async fn movements(&self) -> Vec<InventoryMovement> {
        self.state.read().await.ledger.movements().to_vec()
    }

    // =========================================================================
    // Catalog & Customers
    // =========================================================================

    /// Adds a flavor to the catalog. Adding an existing name is a no-op
    /// that returns the existing flavor.
    pub async fn add_flavor(&self, name: &str) -> AppResult<Flavor> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.flavors.iter().find(|f| f.name == name) {
            debug!(name, "Flavor already in catalog");
            return Ok(existing.clone());
        }

        let flavor = Flavor::new(name);
        self.gateway
            .write("save_flavor", self.gateway.store().save_flavor(&flavor))
            .await;

        state.flavors.push(flavor.clone());
        Ok(flavor)
    }

    /// The flavor catalog.
    pub async fn flavors(&self) -> Vec<Flavor> {
        self.state.read().await.flavors.clone()
    }

    /// Adds a customer to the directory with zeroed counters.
    pub async fn add_customer(&self, name: &str) -> AppResult<Customer> {
        let customer = Customer::new(name);

        self.gateway
            .write("save_customer", self.gateway.store().save_customer(&customer))
            .await;

        let mut state = self.state.write().await;
        state.customers.push(customer.clone());
        Ok(customer)
    }

    /// The customer directory.
    pub async fn customers(&self) -> Vec<Customer> {
        self.state.read().await.customers.clone()
    }

    /// Attaches the session's cart to a customer.
    pub async fn select_customer(&self, customer_id: &str) -> AppResult<()> {
        let state = self.state.read().await;
        if state.customer(customer_id).is_none() {
            return Err(AppError::CustomerNotFound {
                id: customer_id.to_string(),
            });
        }
        drop(state);

        self.session.lock().await.customer_id = Some(customer_id.to_string());
        Ok(())
    }

    /// The customer the session is currently ringing up, if any.
    pub async fn selected_customer(&self) -> Option<String> {
        self.session.lock().await.customer_id.clone()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds loose cookies to the session cart.
    pub async fn add_units_to_cart(
        &self,
        flavor: &str,
        size: CookieSize,
        quantity: i64,
        unit_price: Money,
    ) -> AppResult<String> {
        let mut session = self.session.lock().await;
        Ok(session.cart.add_unit(flavor, size, quantity, unit_price)?)
    }

    /// Adds a completed box selection to the session cart.
    pub async fn add_box_to_cart(
        &self,
        selection: &BoxSelection,
        boxes: i64,
        box_price: Money,
    ) -> AppResult<Vec<String>> {
        let mut session = self.session.lock().await;
        Ok(session.cart.add_box(selection, boxes, box_price)?)
    }

    /// Changes a cart line's quantity; zero or less removes the line.
    pub async fn update_cart_quantity(&self, line_id: &str, quantity: i64) -> AppResult<()> {
        let mut session = self.session.lock().await;
        Ok(session.cart.update_quantity(line_id, quantity)?)
    }

    /// Removes a cart line.
    pub async fn remove_cart_line(&self, line_id: &str) -> AppResult<SaleItem> {
        let mut session = self.session.lock().await;
        Ok(session.cart.remove_line(line_id)?)
    }

    /// Empties the cart without checking out.
    pub async fn clear_cart(&self) {
        self.session.lock().await.cart.clear();
    }

    /// The cart's current lines.
    pub async fn cart_lines(&self) -> Vec<SaleItem> {
        self.session.lock().await.cart.lines().to_vec()
    }

    /// The cart's running total.
    pub async fn cart_total(&self) -> Money {
        self.session.lock().await.cart.total()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Finalizes the session cart into a Sale and a Pending Order.
    ///
    /// Rejects an empty cart or a session without a selected customer with
    /// [`CoreError::CheckoutNotAllowed`], and concurrent finalization with
    /// [`AppError::CheckoutInProgress`] so the customer's lifetime counters
    /// are bumped exactly once per sale. The cart is cleared only after the
    /// order has been handed to the gateway.
    pub async fn checkout(&self) -> AppResult<Order> {
        if self
            .checkout_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::CheckoutInProgress);
        }

        let result = self.finalize_checkout().await;
        self.checkout_in_flight.store(false, Ordering::Release);
        result
    }

    async fn finalize_checkout(&self) -> AppResult<Order> {
        let mut session = self.session.lock().await;
        let customer_id =
            session
                .customer_id
                .clone()
                .ok_or_else(|| CoreError::CheckoutNotAllowed {
                    reason: "no customer selected".to_string(),
                })?;

        let mut state = self.state.write().await;
        let customer = state
            .customer(&customer_id)
            .ok_or_else(|| AppError::CustomerNotFound {
                id: customer_id.clone(),
            })?;

        let sale = Sale::from_cart(&session.cart, customer)?;
        let order = Order::from_sale(&sale);
        let delta = session.cart.counter_delta();

        self.gateway
            .write("save_sale", self.gateway.store().save_sale(&sale))
            .await;
        self.gateway
            .write("save_order", self.gateway.store().save_order(&order))
            .await;
        self.gateway
            .write(
                "apply_counters",
                self.gateway.store().apply_counters(&customer_id, &delta),
            )
            .await;

        if let Some(customer) = state.customer_mut(&customer_id) {
            customer.apply_delta(&delta);
        }
        state.sales.push(sale);
        state.orders.push(order.clone());
        session.cart.clear();

        info!(
            order_id = %order.id,
            customer = %order.customer_name,
            total = %order.total,
            "Checkout complete"
        );
        Ok(order)
    }

    // =========================================================================
    // Order Lifecycle
    // =========================================================================

    /// Marks an order prepared. Timestamp only; stock moves at delivery.
    pub async fn mark_prepared(&self, order_id: &str) -> AppResult<Transition> {
        let mut state = self.state.write().await;
        let idx = state
            .order_index(order_id)
            .ok_or_else(|| AppError::OrderNotFound {
                id: order_id.to_string(),
            })?;

        let mut updated = state.orders[idx].clone();
        if let Transition::AlreadyDone = updated.prepare(Utc::now())? {
            return Ok(Transition::AlreadyDone);
        }

        self.gateway
            .write("update_order", self.gateway.store().update_order(&updated))
            .await;

        state.orders[idx] = updated;
        Ok(Transition::Applied)
    }

    /// Marks an order delivered, deducting its cookies from stock.
    ///
    /// The deduction is all-or-nothing: when any line's pool is short, the
    /// call fails with [`CoreError::InsufficientStock`], no batch is touched
    /// and the order keeps its prior status. Re-delivering an already
    /// delivered order is a no-op with no further stock movement.
    pub async fn mark_delivered(&self, order_id: &str) -> AppResult<Transition> {
        let mut state = self.state.write().await;
        let idx = state
            .order_index(order_id)
            .ok_or_else(|| AppError::OrderNotFound {
                id: order_id.to_string(),
            })?;

        let mut updated = state.orders[idx].clone();
        if let Transition::AlreadyDone = updated.deliver(Utc::now())? {
            return Ok(Transition::AlreadyDone);
        }

        let deductions = state.ledger.deduct_for_order(&updated)?;

        for deduction in &deductions {
            self.gateway
                .write(
                    "apply_deduction",
                    self.gateway.store().apply_deduction(deduction),
                )
                .await;
        }
        self.gateway
            .write("update_order", self.gateway.store().update_order(&updated))
            .await;

        info!(
            order_id,
            lines = deductions.len(),
            "Order delivered, stock deducted"
        );
        state.orders[idx] = updated;
        Ok(Transition::Applied)
    }

    /// Marks an order paid, emitting exactly one income record.
    pub async fn mark_paid(&self, order_id: &str) -> AppResult<Transition> {
        let mut state = self.state.write().await;
        let idx = state
            .order_index(order_id)
            .ok_or_else(|| AppError::OrderNotFound {
                id: order_id.to_string(),
            })?;

        let mut updated = state.orders[idx].clone();
        if let Transition::AlreadyDone = updated.pay(Utc::now())? {
            return Ok(Transition::AlreadyDone);
        }

        let record = FinancialRecord::new(
            RecordKind::Income,
            format!(
                "Sale to {} ({} cookies)",
                updated.customer_name,
                updated.cookie_count()
            ),
            updated.total,
            SALES_CATEGORY,
            Some(&updated.id),
        );

        self.gateway
            .write("update_order", self.gateway.store().update_order(&updated))
            .await;
        self.gateway
            .write("save_record", self.gateway.store().save_record(&record))
            .await;

        info!(order_id, amount = %record.amount, "Order paid, income recorded");
        state.records.push(record);
        state.orders[idx] = updated;
        Ok(Transition::Applied)
    }

    /// Deletes an order and any financial records referencing it.
    ///
    /// Refused once the order is delivered: its cookies have left the shelf
    /// and the ledger trail must stand.
    pub async fn delete_order(&self, order_id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let idx = state
            .order_index(order_id)
            .ok_or_else(|| AppError::OrderNotFound {
                id: order_id.to_string(),
            })?;

        state.orders[idx].ensure_deletable()?;
        let order = state.orders.remove(idx);
        state
            .records
            .retain(|r| r.order_id.as_deref() != Some(order.id.as_str()));

        self.gateway
            .write("delete_order_records", async {
                self.gateway
                    .store()
                    .delete_records_for_order(&order.id)
                    .await
                    .map(|_| ())
            })
            .await;
        self.gateway
            .write("delete_order", self.gateway.store().delete_order(&order.id))
            .await;

        info!(order_id, "Order deleted");
        Ok(())
    }

    /// Orders most recent first. Lifecycle changes never reorder the list.
    pub async fn orders(&self) -> Vec<Order> {
        let mut orders = self.state.read().await.orders.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Looks up a single order.
    pub async fn order(&self, order_id: &str) -> Option<Order> {
        let state = self.state.read().await;
        state.order_index(order_id).map(|idx| state.orders[idx].clone())
    }

    // =========================================================================
    // Financial Records
    // =========================================================================

    /// Records a manual income or expense entry, unattached to any order.
    pub async fn add_record(
        &self,
        kind: RecordKind,
        description: &str,
        amount: Money,
        category: &str,
    ) -> AppResult<FinancialRecord> {
        let record = FinancialRecord::new(kind, description, amount, category, None);

        self.gateway
            .write("save_record", self.gateway.store().save_record(&record))
            .await;

        let mut state = self.state.write().await;
        state.records.push(record.clone());
        Ok(record)
    }

    /// Deletes a manual financial record.
    ///
    /// Records tied to an order are the lifecycle's to manage; they go away
    /// with [`delete_order`](Self::delete_order), not here.
    pub async fn delete_record(&self, record_id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let idx = state
            .records
            .iter()
            .position(|r| r.id == record_id)
            .ok_or_else(|| AppError::RecordNotFound {
                id: record_id.to_string(),
            })?;

        if state.records[idx].order_id.is_some() {
            return Err(AppError::RecordManagedByOrder {
                id: record_id.to_string(),
            });
        }

        state.records.remove(idx);
        self.gateway
            .write(
                "delete_record",
                self.gateway.store().delete_record(record_id),
            )
            .await;

        Ok(())
    }

    /// All financial records, most recent first.
    pub async fn records(&self) -> Vec<FinancialRecord> {
        let mut records = self.state.read().await.records.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}
