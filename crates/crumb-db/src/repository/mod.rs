//! # Repository Layer
//!
//! One repository per aggregate, each a thin cloneable wrapper around the
//! shared pool.
//!
//! ## Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database ──► .customers() / .flavors() / .stock() / .sales()          │
//! │               .orders() / .finance()                                    │
//! │                                                                         │
//! │  Repositories take and return crumb-core domain types; SQL, column     │
//! │  aliasing, and transactions stay inside this module.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod finance;
pub mod flavor;
pub mod order;
pub mod sale;
pub mod stock;
