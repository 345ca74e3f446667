//! Example: Listing customers through the tool facade
//!
//! Loads configuration from the environment (or `.env`, or a config file),
//! fetches a handful of customers and prints the request metrics.
//!
//! # Setup
//!
//! 1. Export `BC_CLIENT_ID`, `BC_CLIENT_SECRET`, `BC_TENANT_ID`,
//!    `BC_ENVIRONMENT` and `BC_COMPANY_ID`, or put them in `.env`
//!
//! 2. Run this example: ```bash cargo run --example list_customers -- 5 ```

use std::sync::Arc;

use anyhow::Context;
use erpbridge_core::{ErpToolService, GetCustomersArgs};
use erpbridge_infra::config;
use erpbridge_infra::observability::logging::{init_tracing, LogFormat};
use erpbridge_infra::ErpApiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = std::env::var("LOG_FORMAT").unwrap_or_default().parse::<LogFormat>()?;
    init_tracing(format)?;

    let limit = std::env::args().nth(1).map(|arg| arg.parse::<u32>()).transpose()?.unwrap_or(5);

    let config = config::load().context("failed to load configuration")?;
    let client = Arc::new(ErpApiClient::from_config(&config)?);
    let service = ErpToolService::new(client.clone());

    if !client.health_check().await? {
        anyhow::bail!("Business Central API is not reachable at {}", client.base_url());
    }

    let customers = service.get_customers(GetCustomersArgs { no: None, limit: Some(limit) }).await;
    println!("{}", serde_json::to_string_pretty(&customers)?);

    let snapshot = client.metrics_snapshot();
    println!(
        "requests={} errors={} error_rate={:.2} avg_latency={:?}",
        snapshot.total_requests, snapshot.error_count, snapshot.error_rate, snapshot.average_latency
    );

    Ok(())
}
