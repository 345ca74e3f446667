//! In-flight request bookkeeping
//!
//! A [`RequestGuard`] registers a [`RequestContext`] on creation and removes
//! it on drop, so every exit path (success, error, `?`, panic unwinding)
//! releases the entry exactly once.

use std::time::Instant;

use dashmap::DashMap;
use reqwest::Method;
use uuid::Uuid;

/// Details of one dispatched call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation_id: Uuid,
    pub method: Method,
    pub path: String,
    /// Start of the current attempt; reset when the call is replayed
    pub started_at: Instant,
    pub attempt: u32,
}

/// Concurrent registry of in-flight calls keyed by correlation id.
#[derive(Debug, Default)]
pub struct RequestTracker {
    active: DashMap<Uuid, RequestContext>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new call and return the guard that owns its entry.
    pub fn begin(&self, method: Method, path: &str) -> RequestGuard<'_> {
        let correlation_id = Uuid::new_v4();
        let context = RequestContext {
            correlation_id,
            method,
            path: path.to_string(),
            started_at: Instant::now(),
            attempt: 1,
        };
        self.active.insert(correlation_id, context);
        RequestGuard { tracker: self, correlation_id }
    }

    pub fn in_flight(&self) -> usize {
        self.active.len()
    }

    pub fn get(&self, correlation_id: &Uuid) -> Option<RequestContext> {
        self.active.get(correlation_id).map(|entry| entry.value().clone())
    }

    pub fn contexts(&self) -> Vec<RequestContext> {
        self.active.iter().map(|entry| entry.value().clone()).collect()
    }
}

/// Scoped ownership of one [`RequestContext`].
#[derive(Debug)]
pub struct RequestGuard<'a> {
    tracker: &'a RequestTracker,
    correlation_id: Uuid,
}

impl RequestGuard<'_> {
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Start time of the current attempt.
    pub fn started_at(&self) -> Instant {
        self.tracker
            .active
            .get(&self.correlation_id)
            .map(|entry| entry.started_at)
            .unwrap_or_else(Instant::now)
    }

    /// Mark the start of a replay: bump the attempt and reset the clock.
    pub fn next_attempt(&self) -> u32 {
        match self.tracker.active.get_mut(&self.correlation_id) {
            Some(mut entry) => {
                entry.attempt += 1;
                entry.started_at = Instant::now();
                entry.attempt
            }
            None => 1,
        }
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.tracker.active.remove(&self.correlation_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_removes_context_on_drop() {
        let tracker = RequestTracker::new();
        let id = {
            let guard = tracker.begin(Method::GET, "/customers");
            assert_eq!(tracker.in_flight(), 1);
            let context = tracker.get(&guard.correlation_id()).unwrap();
            assert_eq!(context.path, "/customers");
            assert_eq!(context.attempt, 1);
            guard.correlation_id()
        };

        assert_eq!(tracker.in_flight(), 0);
        assert!(tracker.get(&id).is_none());
    }

    #[test]
    fn next_attempt_resets_start() {
        let tracker = RequestTracker::new();
        let guard = tracker.begin(Method::POST, "/salesOrders");
        let first = guard.started_at();

        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(guard.next_attempt(), 2);

        assert!(guard.started_at() > first);
    }

    #[test]
    fn guards_are_independent() {
        let tracker = RequestTracker::new();
        let a = tracker.begin(Method::GET, "/items");
        let b = tracker.begin(Method::GET, "/items");
        assert_ne!(a.correlation_id(), b.correlation_id());

        drop(a);
        assert_eq!(tracker.in_flight(), 1);
        assert_eq!(tracker.contexts()[0].correlation_id, b.correlation_id());
    }

    #[test]
    fn context_released_when_unwinding() {
        let tracker = RequestTracker::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = tracker.begin(Method::GET, "/customers");
            panic!("boom");
        }));

        assert!(result.is_err());
        assert_eq!(tracker.in_flight(), 0);
    }
}
