//! Branch rule storage seam.
//!
//! The resolver never fetches rules itself. A [`RuleStore`] supplies the
//! stored records for a scope; [`MemoryRuleStore`] is the implementation
//! backed by the rules file.

use crate::config::RulesToml;
use crate::errors::StoreError;
use crate::rule::{BranchRule, RuleScope};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An application and the project it inherits rules from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: u64,
    pub project_id: u64,
    /// Raw extra JSON blob as stored by the application service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

/// Source of branch rules and application metadata.
pub trait RuleStore {
    /// Rules owned by a scope, in stored order.
    fn branch_rules(&self, scope: RuleScope, scope_id: u64) -> Result<Vec<BranchRule>, StoreError>;

    fn application(&self, app_id: u64) -> Result<ApplicationRecord, StoreError>;
}

impl<S: RuleStore + ?Sized> RuleStore for &S {
    fn branch_rules(&self, scope: RuleScope, scope_id: u64) -> Result<Vec<BranchRule>, StoreError> {
        (**self).branch_rules(scope, scope_id)
    }

    fn application(&self, app_id: u64) -> Result<ApplicationRecord, StoreError> {
        (**self).application(app_id)
    }
}

/// In-memory rule store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRuleStore {
    rules: HashMap<(RuleScope, u64), Vec<BranchRule>>,
    applications: HashMap<u64, ApplicationRecord>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a loaded rules file. Rule order within a scope is
    /// the order of the file.
    pub fn from_config(config: &RulesToml) -> Self {
        let mut store = Self::new();
        for rule in &config.rules {
            store.add_rule(rule.clone());
        }
        for app in &config.applications {
            store.add_application(app.clone());
        }
        store
    }

    pub fn add_rule(&mut self, rule: BranchRule) {
        self.rules
            .entry((rule.scope, rule.scope_id))
            .or_default()
            .push(rule);
    }

    pub fn add_application(&mut self, app: ApplicationRecord) {
        self.applications.insert(app.id, app);
    }
}

impl RuleStore for MemoryRuleStore {
    fn branch_rules(&self, scope: RuleScope, scope_id: u64) -> Result<Vec<BranchRule>, StoreError> {
        Ok(self
            .rules
            .get(&(scope, scope_id))
            .cloned()
            .unwrap_or_default())
    }

    fn application(&self, app_id: u64) -> Result<ApplicationRecord, StoreError> {
        self.applications
            .get(&app_id)
            .cloned()
            .ok_or(StoreError::ApplicationNotFound { id: app_id })
    }
}
