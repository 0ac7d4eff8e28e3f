//! Cache invalidation contract
//!
//! Read caches over observations and exceptions live outside this crate. After
//! a structural change the core asks for the affected scope to be dropped.

use std::sync::Mutex;
use tracing::debug;

/// Portion of a read cache made stale by a write
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// Observations and flags for one station
    Station(i32),
    /// Exception listings and their facts
    Exceptions,
    /// Everything
    All,
}

/// Receiver for invalidation requests
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, scope: CacheScope);
}

/// Invalidator for deployments without a read cache
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl CacheInvalidator for NoCache {
    fn invalidate(&self, scope: CacheScope) {
        debug!("No cache configured, ignoring invalidation of {:?}", scope);
    }
}

/// Invalidator that records every request, in order
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
    requests: Mutex<Vec<CacheScope>>,
}

impl RecordingInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CacheScope> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl CacheInvalidator for RecordingInvalidator {
    fn invalidate(&self, scope: CacheScope) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(scope);
        }
    }
}
