//! # kaos-db: Database Layer for Kaos Inventory
//!
//! This crate provides database access for the inventory/consignment system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Kaos Inventory Data Flow                           │
//! │                                                                         │
//! │  Engine Service (e.g. ConsignmentEngine::process_return)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kaos-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │(consignment...│    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Transactions  │◄───│ Consignment.. │    │ ...          │  │   │
//! │  │   │ Management    │    │ ActivityRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (./kaos.db, WAL mode)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kaos_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/kaos.db");
//! let db = Database::new(config).await?;
//!
//! let products = db.products().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::activity::ActivityRepository;
pub use repository::consignment::ConsignmentRepository;
pub use repository::generate_id;
pub use repository::product::ProductRepository;
pub use repository::reseller::ResellerRepository;
pub use repository::sale::SaleRepository;
