//! # Cart Module
//!
//! The in-progress sale cart and the box selection rules.
//!
//! ## Cart Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Lifecycle                                  │
//! │                                                                         │
//! │  add_unit / add_box ──► lines (merged on (flavor, size, sale type))     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  update_quantity (≤ 0 removes) / remove_line                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  checkout snapshots the lines into a Sale, then clear()                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Box Rules
//! A box order is composed through a [`BoxSelection`]: per-flavor counts that
//! must sum to EXACTLY the box capacity (4 or 6) before the add is accepted.
//! An incomplete box is rejected with [`CoreError::IncompleteBox`] and never
//! touches the cart.
//!
//! Line quantities count boxes for box lines and cookies for unit lines; the
//! per-line capacity field records how many cookies of that line's flavor go
//! into each box, so a mixed box splits into per-flavor lines whose cookie
//! and money totals still sum to exactly one box.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CookieSize, CounterDelta, SaleItem, SaleType};
use crate::validation::validate_line_quantity;
use crate::MAX_CART_LINES;

// =============================================================================
// Box Selection
// =============================================================================

/// A box order being composed: which flavors fill the box, and how many
/// cookies of each.
///
/// The selection is the caller-facing gate for box completeness: the cart
/// only accepts it once the counts sum to the capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSelection {
    sale_type: SaleType,
    size: CookieSize,
    counts: Vec<(String, i64)>,
}

impl BoxSelection {
    /// Starts an empty box of four.
    pub fn box4(size: CookieSize) -> Self {
        BoxSelection {
            sale_type: SaleType::Box4,
            size,
            counts: Vec::new(),
        }
    }

    /// Starts an empty box of six.
    pub fn box6(size: CookieSize) -> Self {
        BoxSelection {
            sale_type: SaleType::Box6,
            size,
            counts: Vec::new(),
        }
    }

    pub fn sale_type(&self) -> SaleType {
        self.sale_type
    }

    pub fn size(&self) -> CookieSize {
        self.size
    }

    /// Sets how many cookies of a flavor go into the box; 0 removes it.
    pub fn set_flavor(&mut self, flavor: &str, count: i64) {
        self.counts.retain(|(f, _)| f != flavor);
        if count > 0 {
            self.counts.push((flavor.to_string(), count));
        }
    }

    /// Per-flavor counts in selection order.
    pub fn counts(&self) -> &[(String, i64)] {
        &self.counts
    }

    /// Total cookies currently selected.
    pub fn selected(&self) -> i64 {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    /// Cookies the box holds (4 or 6).
    pub fn capacity(&self) -> i64 {
        // Box constructors are the only way in, so the capacity is present.
        self.sale_type.box_capacity().unwrap_or(0)
    }

    /// True once the selection fills the box exactly.
    pub fn is_complete(&self) -> bool {
        self.selected() == self.capacity()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The current in-progress sale: an ordered list of lines.
///
/// One cart exists per session. Checkout snapshots the lines into a `Sale`
/// and clears the cart only after the order is confirmed persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<SaleItem>,
    created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn lines(&self) -> &[SaleItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of line totals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.total).sum()
    }

    // =========================================================================
    // Adding Lines
    // =========================================================================

    /// Adds loose cookies to the cart, merging into an existing unit line
    /// for the same (flavor, size) if one exists.
    ///
    /// Returns the id of the created or merged line.
    pub fn add_unit(
        &mut self,
        flavor: &str,
        size: CookieSize,
        quantity: i64,
        unit_price: Money,
    ) -> CoreResult<String> {
        validate_line_quantity("quantity", quantity)?;

        let item = SaleItem::new(flavor, size, quantity, unit_price, SaleType::Unit);
        self.merge_or_append(item)
    }

    /// Adds `boxes` copies of a completed box selection to the cart.
    ///
    /// Each selected flavor becomes (or merges into) its own box line with
    /// quantity counted in boxes. The line's capacity field carries that
    /// flavor's cookies-per-box share and its unit price that flavor's share
    /// of the box price, so both cookie counts and money sum exactly to
    /// `boxes × box_price` across the produced lines. Any rounding remainder
    /// from the price split lands on the first flavor.
    ///
    /// Returns the ids of the created or merged lines.
    pub fn add_box(
        &mut self,
        selection: &BoxSelection,
        boxes: i64,
        box_price: Money,
    ) -> CoreResult<Vec<String>> {
        validate_line_quantity("boxes", boxes)?;

        if !selection.is_complete() {
            return Err(CoreError::IncompleteBox {
                selected: selection.selected(),
                capacity: selection.capacity(),
            });
        }

        let capacity = selection.capacity();
        let mut allocated = Money::zero();
        let mut line_ids = Vec::with_capacity(selection.counts().len());

        for (i, (flavor, count)) in selection.counts().iter().enumerate() {
            let share_price = if i == 0 {
                // First flavor takes whatever the even split leaves over, so
                // the shares always sum to the full box price.
                Money::from_cents(
                    box_price.cents() - (box_price.cents() / capacity) * (capacity - count),
                )
            } else {
                Money::from_cents(box_price.cents() / capacity * count)
            };
            allocated += share_price * boxes;

            let mut item = SaleItem::new(
                flavor,
                selection.size(),
                boxes,
                share_price,
                selection.sale_type(),
            );
            item.box_capacity = Some(*count);

            line_ids.push(self.merge_or_append(item)?);
        }

        debug_assert_eq!(allocated, box_price * boxes);
        Ok(line_ids)
    }

    /// Merges the item into a matching line or appends it.
    ///
    /// The merge key is (flavor, size, sale type); box lines additionally
    /// require the same price and per-box share so differently-composed
    /// boxes stay on separate lines.
    fn merge_or_append(&mut self, item: SaleItem) -> CoreResult<String> {
        let found = self.lines.iter_mut().find(|l| {
            l.merge_key() == item.merge_key()
                && l.unit_price == item.unit_price
                && l.box_capacity == item.box_capacity
        });

        match found {
            Some(line) => {
                validate_line_quantity("quantity", line.quantity + item.quantity)?;
                line.set_quantity(line.quantity + item.quantity);
                Ok(line.id.clone())
            }
            None => {
                if self.lines.len() >= MAX_CART_LINES {
                    return Err(CoreError::CartTooLarge {
                        max: MAX_CART_LINES,
                    });
                }
                let id = item.id.clone();
                self.lines.push(item);
                Ok(id)
            }
        }
    }

    // =========================================================================
    // Editing Lines
    // =========================================================================

    /// Sets a line's quantity; a quantity ≤ 0 removes the line.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_line(line_id)?;
            return Ok(());
        }
        validate_line_quantity("quantity", quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound {
                line_id: line_id.to_string(),
            })?;
        line.set_quantity(quantity);
        Ok(())
    }

    /// Removes a line, returning it.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<SaleItem> {
        let idx = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound {
                line_id: line_id.to_string(),
            })?;
        Ok(self.lines.remove(idx))
    }

    /// Empties the cart. Called automatically after a confirmed checkout.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    // =========================================================================
    // Checkout Support
    // =========================================================================

    /// Computes the customer counter increment for this cart.
    ///
    /// Unit-line quantities feed the loose-cookie counter; box-line
    /// quantities (in boxes) feed their own box counter.
    pub fn counter_delta(&self) -> CounterDelta {
        let mut delta = CounterDelta {
            orders: 1,
            ..CounterDelta::default()
        };
        for line in &self.lines {
            match line.sale_type {
                SaleType::Unit => delta.units += line.quantity,
                SaleType::Box4 => delta.box4 += line.quantity,
                SaleType::Box6 => delta.box6 += line.quantity,
            }
        }
        delta
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
