//! # erpbridge Domain
//!
//! Business domain types for the Business Central integration.
//!
//! This crate contains:
//! - Entity models (Customer, Item, SalesOrderHeader, SalesOrderLine)
//! - Request bodies and list query parameters
//! - The `ErpError` taxonomy and `Result` alias
//! - Configuration structures
//! - Argument validation helpers
//!
//! ## Architecture
//! - No dependencies on other erpbridge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
