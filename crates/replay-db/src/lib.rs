//! # replay-db: Database Layer for the Replay Ledger
//!
//! This crate provides database access for the Replay inventory ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Replay Ledger Data Flow                           │
//! │                                                                         │
//! │  Ledger service (create_sale, transition_sale, ...)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     replay-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │ (catalog.rs,   │    │  (embedded)  │   │    │
//! │  │   │               │    │  acquisition,  │    │              │   │    │
//! │  │   │ SqlitePool    │◄───│  sale, trade)  │    │ 001_init.sql │   │    │
//! │  │   │ WAL, FKs      │    │                │    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (file or :memory: for tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, acquisition, sale, trade)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use replay_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/ledger.db");
//! let db = Database::new(config).await?;
//!
//! let sku = db.catalog().get_by_barcode("0045496830434").await?;
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
pub use repository::acquisition::AcquisitionRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::sale::SaleRepository;
pub use repository::trade::TradeRepository;
