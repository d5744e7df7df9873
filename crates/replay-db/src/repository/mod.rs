//! # Repository Module
//!
//! One repository per aggregate:
//! - `catalog` - SKUs and the atomic stock primitives
//! - `acquisition` - supplier purchases
//! - `sale` - customer orders
//! - `trade` - barter transactions
//!
//! Repositories are thin: SQL in, domain types out. Multi-statement
//! workflows (fulfill, reverse) are orchestrated a level up, which opens
//! the transaction and threads the connection through these methods.

pub mod acquisition;
pub mod catalog;
pub mod sale;
pub mod trade;

pub use acquisition::AcquisitionRepository;
pub use catalog::CatalogRepository;
pub use sale::SaleRepository;
pub use trade::TradeRepository;
