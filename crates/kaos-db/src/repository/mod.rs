//! # Repository Module
//!
//! Database repository implementations for Kaos Inventory.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine Service                                                         │
//! │       │                                                                 │
//! │       │  db.products().get("uuid").await                               │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self)                                                       │
//! │  ├── get(&self, id)                                                    │
//! │  ├── insert(&self, product)                                            │
//! │  └── adjust_stock_tx(&self, conn, id, delta)                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The `_tx` Convention
//!
//! Pool-based methods serve reads and standalone writes. Every repository
//! also exposes `*_tx` variants taking `&mut SqliteConnection` for composite
//! operations that must be atomic (consignment creation, returns, direct
//! sales). Call sites borrow out of a transaction with `&mut *tx` and commit
//! once all steps succeeded.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD and stock adjustment
//! - [`reseller::ResellerRepository`] - Reseller registry
//! - [`consignment::ConsignmentRepository`] - Consignments and their items
//! - [`sale::SaleRepository`] - Sale records
//! - [`activity::ActivityRepository`] - Append-only activity log

pub mod activity;
pub mod consignment;
pub mod product;
pub mod reseller;
pub mod sale;

use uuid::Uuid;

/// Generates a new entity ID (UUID v4, string form).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
