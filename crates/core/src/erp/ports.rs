//! Port for the Business Central resource API

use async_trait::async_trait;
use erpbridge_domain::{
    Customer, Item, ListQuery, Result, SalesOrderHeader, SalesOrderLine, ShipAndInvoiceOutcome,
};

/// Typed operations against one Business Central company.
///
/// Implementations validate their own arguments and return
/// `ErpError::Validation` before sending anything upstream.
#[async_trait]
pub trait ErpClient: Send + Sync {
    async fn list_customers(&self, query: &ListQuery) -> Result<Vec<Customer>>;

    async fn list_items(&self, query: &ListQuery) -> Result<Vec<Item>>;

    async fn list_sales_orders(&self, query: &ListQuery) -> Result<Vec<SalesOrderHeader>>;

    async fn list_sales_order_lines(&self, order_id: &str) -> Result<Vec<SalesOrderLine>>;

    async fn create_sales_order(&self, customer_number: &str) -> Result<SalesOrderHeader>;

    async fn create_sales_order_line(
        &self,
        order_id: &str,
        line_object_number: &str,
        quantity: f64,
    ) -> Result<SalesOrderLine>;

    /// Post the order. An upstream rejection comes back as
    /// `Ok(outcome)` with `success == false`.
    async fn ship_and_invoice_order(&self, order_id: &str) -> Result<ShipAndInvoiceOutcome>;
}
