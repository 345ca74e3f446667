//! # erpbridge Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The OAuth client-credentials manager
//! - The authenticated request pipeline and Business Central resource calls
//! - Request metrics and tracing setup
//! - Configuration loading from the environment or files
//!
//! ## Architecture
//! - Implements `erpbridge_core::ErpClient`
//! - Depends on `erpbridge-domain`, `erpbridge-core` and `erpbridge-common`
//! - Contains all "impure" code (network I/O, environment access)

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ErpApiClient, ErpApiClientBuilder, RequestContext, RequestTracker};
pub use auth::{Credential, CredentialManager, CredentialProvider};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::metrics::{MetricsSnapshot, RequestMetrics};
