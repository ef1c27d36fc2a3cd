//! # kaos-engine: Service Layer for Kaos Inventory
//!
//! The operations callers actually invoke, layered over kaos-core (pure
//! rules) and kaos-db (persistence).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Kaos Inventory Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                ★ kaos-engine (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────────┐ ┌──────────────────┐ ┌───────────────┐       │   │
//! │  │  │ProductLedger │ │ConsignmentEngine │ │ SalesRecorder │       │   │
//! │  │  │  stock moves │ │  aktif→lunas...  │ │  two channels │       │   │
//! │  │  └──────────────┘ └──────────────────┘ └───────────────┘       │   │
//! │  │            ┌─────────────┐                                      │   │
//! │  │            │ ActivityLog │  every mutation leaves a trace       │   │
//! │  │            └─────────────┘                                      │   │
//! │  └────────────────┬────────────────────────────┬───────────────────┘   │
//! │                   │                            │                        │
//! │         ┌─────────▼──────────┐      ┌──────────▼─────────┐             │
//! │         │     kaos-core      │      │      kaos-db       │             │
//! │         │  types, status,    │      │  SQLite pool,      │             │
//! │         │  money, validation │      │  repositories, tx  │             │
//! │         └────────────────────┘      └────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Discipline
//!
//! Every composite operation (consignment creation, return processing,
//! direct sale) runs inside ONE SQLite transaction, activity entry included:
//! either the whole operation lands or none of it does.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kaos_db::{Database, DbConfig};
//! use kaos_engine::{ConsignmentEngine, ProductLedger};
//!
//! let db = Database::new(DbConfig::new("./kaos.db")).await?;
//! let ledger = ProductLedger::new(db.clone());
//! let engine = ConsignmentEngine::new(db.clone());
//!
//! let consignment = engine.process_payment(&id, 800_000).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod activity;
pub mod consignment;
pub mod error;
pub mod ledger;
pub mod sales;

// =============================================================================
// Re-exports
// =============================================================================

pub use activity::ActivityLog;
pub use consignment::{
    ConsignmentDetail, ConsignmentEdit, ConsignmentEngine, ItemWithProduct, NewConsignment,
    NewConsignmentLine, NewReseller, ResellerUpdate, ReturnLine,
};
pub use error::{EngineError, EngineResult, ErrorCode};
pub use ledger::{NewProduct, ProductLedger, ProductUpdate};
pub use sales::{NewConsignmentSale, NewDirectSale, SaleDetail, SaleLine, SalesRecorder};
