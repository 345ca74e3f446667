//! Business Central resource operations
//!
//! Each operation validates its arguments, builds the path (and body) under
//! the company base URL, and runs it through the pipeline in `client`.

use async_trait::async_trait;
use erpbridge_core::ErpClient;
use erpbridge_domain::validation::{
    check_limit, check_quantity, parse_order_id, require_non_blank, MAX_CUSTOMER_LIMIT,
    MAX_DOCUMENT_LIMIT,
};
use erpbridge_domain::{
    Customer, ErpError, Item, ListQuery, ODataCollection, Result, SalesOrderCreateRequest,
    SalesOrderHeader, SalesOrderLine, SalesOrderLineCreateRequest, ShipAndInvoiceOutcome,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::client::ErpApiClient;

/// `<resource>?$top=<n>[&$filter=<encoded>]`
fn list_path(resource: &str, query: &ListQuery) -> String {
    let mut path = format!("{resource}?$top={}", query.effective_limit());
    if let Some(filter) = query.filter.as_deref().filter(|f| !f.trim().is_empty()) {
        path.push_str("&$filter=");
        path.push_str(&urlencoding::encode(filter));
    }
    path
}

fn order_path(order_id: &str, suffix: &str) -> Result<String> {
    let id = parse_order_id(order_id)?;
    Ok(format!("/salesOrders({id}){suffix}"))
}

fn to_body<T: serde::Serialize>(request: &T) -> Result<Value> {
    serde_json::to_value(request)
        .map_err(|e| ErpError::Internal(format!("Failed to serialize body: {e}")))
}

impl ErpApiClient {
    async fn list<T: DeserializeOwned>(&self, resource: &str, query: &ListQuery) -> Result<Vec<T>> {
        let path = list_path(resource, query);
        let collection: ODataCollection<T> = self.send(Method::GET, &path, None).await?;
        Ok(collection.into_values())
    }
}

#[async_trait]
impl ErpClient for ErpApiClient {
    #[instrument(skip(self))]
    async fn list_customers(&self, query: &ListQuery) -> Result<Vec<Customer>> {
        check_limit(query.limit, MAX_CUSTOMER_LIMIT)?;
        self.list("/customers", query).await
    }

    #[instrument(skip(self))]
    async fn list_items(&self, query: &ListQuery) -> Result<Vec<Item>> {
        check_limit(query.limit, MAX_DOCUMENT_LIMIT)?;
        self.list("/items", query).await
    }

    #[instrument(skip(self))]
    async fn list_sales_orders(&self, query: &ListQuery) -> Result<Vec<SalesOrderHeader>> {
        check_limit(query.limit, MAX_DOCUMENT_LIMIT)?;
        self.list("/salesOrders", query).await
    }

    #[instrument(skip(self))]
    async fn list_sales_order_lines(&self, order_id: &str) -> Result<Vec<SalesOrderLine>> {
        let path = order_path(order_id, "/salesOrderLines")?;
        let collection: ODataCollection<SalesOrderLine> =
            self.send(Method::GET, &path, None).await?;
        Ok(collection.into_values())
    }

    #[instrument(skip(self))]
    async fn create_sales_order(&self, customer_number: &str) -> Result<SalesOrderHeader> {
        let customer_number = require_non_blank("customer_number", customer_number)?;
        let body = to_body(&SalesOrderCreateRequest { customer_number: customer_number.to_string() })?;

        let order: SalesOrderHeader = self.send(Method::POST, "/salesOrders", Some(&body)).await?;
        info!(order_id = %order.id, number = %order.number, "sales order created");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn create_sales_order_line(
        &self,
        order_id: &str,
        line_object_number: &str,
        quantity: f64,
    ) -> Result<SalesOrderLine> {
        let path = order_path(order_id, "/salesOrderLines")?;
        let line_object_number = require_non_blank("line_object_number", line_object_number)?;
        check_quantity(quantity)?;
        let body = to_body(&SalesOrderLineCreateRequest::item(line_object_number, quantity))?;

        self.send(Method::POST, &path, Some(&body)).await
    }

    #[instrument(skip(self))]
    async fn ship_and_invoice_order(&self, order_id: &str) -> Result<ShipAndInvoiceOutcome> {
        let path = order_path(order_id, "/Microsoft.NAV.shipAndInvoice")?;

        match self.send_value(Method::POST, &path, None).await {
            Ok(value) => {
                info!("sales order shipped and invoiced");
                let data = if value.is_null() { None } else { Some(value) };
                Ok(ShipAndInvoiceOutcome::shipped(order_id, data))
            }
            Err(ErpError::Api { status, body }) => {
                warn!(status, "ship and invoice rejected");
                Ok(ShipAndInvoiceOutcome::rejected(status, &body))
            }
            Err(err) => Err(err),
        }
    }
}
