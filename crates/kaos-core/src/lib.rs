//! # kaos-core: Pure Business Logic for Kaos Inventory
//!
//! This crate is the **heart** of the inventory/consignment system. It
//! contains all business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Kaos Inventory Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   kaos-engine (Services)                        │   │
//! │  │   ProductLedger ── ConsignmentEngine ── SalesRecorder           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kaos-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │  status   │  │ validation│   │   │
//! │  │   │  Product  │  │   Money   │  │  aktif →  │  │   rules   │   │   │
//! │  │   │Consignment│  │  (rupiah) │  │  lunas    │  │   checks  │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kaos-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Consignment, Sale, Activity, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`status`] - The consignment status state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole rupiah (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kaos_core::Money` instead of
// `use kaos_core::money::Money`.

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default threshold for the low-stock report (`stock <= threshold`).
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 30;

/// Default number of entries returned by the recent-activity feed.
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 10;

/// Maximum quantity accepted for a single consignment or sale line.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 9999;
