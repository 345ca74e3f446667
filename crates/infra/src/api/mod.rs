//! Authenticated Business Central API client
//!
//! [`ErpApiClient`] runs every call through one pipeline: correlation id,
//! bearer credential, bounded timeout, single replay on 401, metrics and the
//! GET response cache. The typed resource operations live in `resources`.

mod client;
mod context;
mod resources;

pub use client::{ErpApiClient, ErpApiClientBuilder, CORRELATION_HEADER, RETRY_HEADER};
pub use context::{RequestContext, RequestGuard, RequestTracker};
