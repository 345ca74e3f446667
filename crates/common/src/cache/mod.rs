//! In-memory key/value cache with per-entry time-to-live.
//!
//! Entries are never evicted proactively: a stale entry is removed the next
//! time it is read, or by an explicit [`TtlCache::purge_expired`].

mod stats;
mod ttl;

pub use stats::CacheStats;
pub use ttl::TtlCache;
