//! # erpbridge Core
//!
//! Business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The `ErpClient` port implemented by the HTTP adapter in `erpbridge-infra`
//! - `ErpToolService`, the argument-level facade exposed to agent tooling
//!
//! ## Architecture Principles
//! - Only depends on `erpbridge-domain`
//! - No HTTP or credential handling
//! - All external dependencies via traits

pub mod erp;

pub use erp::ports::ErpClient;
pub use erp::service::ErpToolService;
pub use erp::tools::{
    CreateSalesOrderArgs, CreateSalesOrderLineArgs, GetCustomersArgs, GetItemsArgs,
    GetSalesOrderLinesArgs, GetSalesOrdersArgs, ShipAndInvoiceOrderArgs, ToolResponse,
};
