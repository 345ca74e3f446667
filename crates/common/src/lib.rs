//! Modular common utilities shared across erpbridge crates.
//!
//! # Feature Tiers
//!
//! - `runtime` (default): clock abstraction and the TTL cache used by the
//!   request pipeline

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod time;

#[cfg(feature = "runtime")]
pub use cache::{CacheStats, TtlCache};
#[cfg(feature = "runtime")]
pub use time::{Clock, MockClock, SystemClock};
