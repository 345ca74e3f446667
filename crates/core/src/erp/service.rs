//! Tool facade over the [`ErpClient`] port
//!
//! Turns tool arguments into list queries, validates them, and folds every
//! failure into the `{ error }` envelope so callers never see a raw error.

use std::sync::Arc;

use erpbridge_domain::validation::{check_limit, MAX_CUSTOMER_LIMIT, MAX_DOCUMENT_LIMIT};
use erpbridge_domain::{
    eq_filter, join_filters, Customer, ErpError, Item, ListQuery, Result, SalesOrderHeader,
    SalesOrderLine, ShipAndInvoiceOutcome,
};
use tracing::{instrument, warn};

use super::ports::ErpClient;
use super::tools::{
    CreateSalesOrderArgs, CreateSalesOrderLineArgs, GetCustomersArgs, GetItemsArgs,
    GetSalesOrderLinesArgs, GetSalesOrdersArgs, ShipAndInvoiceOrderArgs, ToolResponse,
};

/// Agent-facing operations for one Business Central company
pub struct ErpToolService {
    client: Arc<dyn ErpClient>,
}

impl ErpToolService {
    pub fn new(client: Arc<dyn ErpClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn get_customers(&self, args: GetCustomersArgs) -> ToolResponse<Vec<Customer>> {
        let result = async {
            let query = list_query(
                MAX_CUSTOMER_LIMIT,
                args.limit,
                [args.no.as_deref().map(|no| eq_filter("number", no))],
            )?;
            let customers = self.client.list_customers(&query).await?;
            Ok::<_, ErpError>(truncate(customers, query.effective_limit()))
        }
        .await;
        respond("get_customers", result)
    }

    #[instrument(skip(self))]
    pub async fn get_items(&self, args: GetItemsArgs) -> ToolResponse<Vec<Item>> {
        let result = async {
            let query = list_query(
                MAX_DOCUMENT_LIMIT,
                args.limit,
                [
                    args.number.as_deref().map(|n| eq_filter("number", n)),
                    args.item_category_code.as_deref().map(|c| eq_filter("itemCategoryCode", c)),
                ],
            )?;
            let items = self.client.list_items(&query).await?;
            Ok::<_, ErpError>(truncate(items, query.effective_limit()))
        }
        .await;
        respond("get_items", result)
    }

    #[instrument(skip(self))]
    pub async fn get_sales_orders(
        &self,
        args: GetSalesOrdersArgs,
    ) -> ToolResponse<Vec<SalesOrderHeader>> {
        let result = async {
            let query = list_query(
                MAX_DOCUMENT_LIMIT,
                args.limit,
                [args.number.as_deref().map(|n| eq_filter("number", n))],
            )?;
            let orders = self.client.list_sales_orders(&query).await?;
            Ok::<_, ErpError>(truncate(orders, query.effective_limit()))
        }
        .await;
        respond("get_sales_orders", result)
    }

    #[instrument(skip(self))]
    pub async fn get_sales_order_lines(
        &self,
        args: GetSalesOrderLinesArgs,
    ) -> ToolResponse<Vec<SalesOrderLine>> {
        let result = self.client.list_sales_order_lines(&args.order_id).await;
        respond("get_sales_order_lines", result)
    }

    #[instrument(skip(self))]
    pub async fn create_sales_order(
        &self,
        args: CreateSalesOrderArgs,
    ) -> ToolResponse<SalesOrderHeader> {
        let result = self.client.create_sales_order(&args.customer_number).await;
        respond("create_sales_order", result)
    }

    #[instrument(skip(self))]
    pub async fn create_sales_order_line(
        &self,
        args: CreateSalesOrderLineArgs,
    ) -> ToolResponse<SalesOrderLine> {
        let result = self
            .client
            .create_sales_order_line(&args.order_id, &args.line_object_number, args.quantity)
            .await;
        respond("create_sales_order_line", result)
    }

    /// Always yields an outcome; errors become `success: false`.
    #[instrument(skip(self))]
    pub async fn ship_and_invoice_order(
        &self,
        args: ShipAndInvoiceOrderArgs,
    ) -> ShipAndInvoiceOutcome {
        match self.client.ship_and_invoice_order(&args.order_id).await {
            Ok(outcome) => outcome,
            Err(err) => {
                log_failure("ship_and_invoice_order", &err);
                ShipAndInvoiceOutcome { success: false, message: err.to_string(), data: None }
            }
        }
    }
}

fn list_query<const N: usize>(
    max: u32,
    limit: Option<u32>,
    clauses: [Option<String>; N],
) -> Result<ListQuery> {
    check_limit(limit, max)?;
    let mut query = ListQuery { filter: join_filters(clauses.into_iter().flatten()), limit };
    query.limit = Some(query.effective_limit());
    Ok(query)
}

fn truncate<T>(mut values: Vec<T>, limit: u32) -> Vec<T> {
    values.truncate(limit as usize);
    values
}

fn respond<T>(tool: &'static str, result: Result<T>) -> ToolResponse<T> {
    if let Err(err) = &result {
        log_failure(tool, err);
    }
    result.into()
}

fn log_failure(tool: &'static str, err: &ErpError) {
    warn!(tool, category = ?err.category(), status = ?err.status(), error = %err, "tool call failed");
}
