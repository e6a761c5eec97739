//! TTL cache in front of a rule store.
//!
//! Callers that fetch rules on every push event wrap their store in a
//! [`CachedRuleStore`] and pass it to the service. Application lookups are
//! not cached.

use crate::errors::StoreError;
use crate::rule::{BranchRule, RuleScope};
use crate::store::{ApplicationRecord, RuleStore};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct CacheEntry {
    rules: Vec<BranchRule>,
    fetched_at: Instant,
}

/// Memoises `branch_rules` per scope for a fixed time-to-live.
///
/// A zero TTL disables caching entirely.
pub struct CachedRuleStore<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<(RuleScope, u64), CacheEntry>>,
}

impl<S: RuleStore> CachedRuleStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the cached rules of one scope.
    pub fn invalidate(&self, scope: RuleScope, scope_id: u64) -> Result<(), StoreError> {
        self.lock()?.remove(&(scope, scope_id));
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.lock()?.clear();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<(RuleScope, u64), CacheEntry>>, StoreError> {
        self.entries.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl<S: RuleStore> RuleStore for CachedRuleStore<S> {
    fn branch_rules(&self, scope: RuleScope, scope_id: u64) -> Result<Vec<BranchRule>, StoreError> {
        if self.ttl.is_zero() {
            return self.inner.branch_rules(scope, scope_id);
        }

        if let Some(entry) = self.lock()?.get(&(scope, scope_id))
            && entry.fetched_at.elapsed() < self.ttl
        {
            tracing::debug!(%scope, scope_id, "branch rule cache hit");
            return Ok(entry.rules.clone());
        }

        tracing::debug!(%scope, scope_id, "branch rule cache miss");
        // Fetch without holding the lock; concurrent misses may both fetch.
        let rules = self.inner.branch_rules(scope, scope_id)?;
        let mut entries = self.lock()?;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        entries.insert(
            (scope, scope_id),
            CacheEntry {
                rules: rules.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(rules)
    }

    fn application(&self, app_id: u64) -> Result<ApplicationRecord, StoreError> {
        self.inner.application(app_id)
    }
}
