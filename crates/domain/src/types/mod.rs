//! Business Central entity models and request payloads
//!
//! Field names follow the OData v2.0 API (camelCase on the wire).

mod customer;
mod item;
mod odata;
mod outcome;
mod requests;
mod sales_order;

pub use customer::Customer;
pub use item::Item;
pub use odata::{eq_filter, escape_literal, join_filters, ODataCollection};
pub use outcome::ShipAndInvoiceOutcome;
pub use requests::{ListQuery, SalesOrderCreateRequest, SalesOrderLineCreateRequest, DEFAULT_LIST_LIMIT};
pub use sales_order::{SalesOrderHeader, SalesOrderLine};
