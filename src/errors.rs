//! Typed error hierarchy for branch rule resolution.
//!
//! - `UnsupportedReferenceError` : the only error of the pure classifier
//! - `ParseWorkspaceError` : an unknown workspace name
//! - `RuleError` : a stored branch rule that cannot be compiled
//! - `StoreError` : rule store lookups
//! - `ExtraError` : application workspace extra parsing

use crate::rule::RuleScope;
use thiserror::Error;

/// Reference categories accepted by the git-flow classifier.
pub const ACCEPTED_REFERENCE_PATTERNS: &[&str] = &[
    "master",
    "develop",
    "feature/*",
    "release/*",
    "hotfix/*",
    "support/*",
    "release tag (e.g. v1.0.0)",
];

/// A reference that is neither a git-flow branch nor a release tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unsupported reference '{reference}', valid references: {}",
    .accepted.join(", ")
)]
pub struct UnsupportedReferenceError {
    pub reference: String,
    pub accepted: &'static [&'static str],
}

impl UnsupportedReferenceError {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            accepted: ACCEPTED_REFERENCE_PATTERNS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid workspace '{0}'. Valid values: DEV, TEST, STAGING, PROD")]
pub struct ParseWorkspaceError(pub String);

/// Errors raised while compiling a stored branch rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Rule '{pattern}' references unknown workspace '{value}'")]
    UnknownWorkspace { pattern: String, value: String },

    #[error("Rule '{pattern}' references reserved workspace DEFAULT")]
    ReservedWorkspace { pattern: String },
}

/// Errors from a rule store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Application {id} not found")]
    ApplicationNotFound { id: u64 },

    #[error("Invalid branch rule for {scope} {scope_id}: {source}")]
    InvalidRule {
        scope: RuleScope,
        scope_id: u64,
        #[source]
        source: RuleError,
    },

    #[error("Invalid extra for application {id}: {source}")]
    InvalidExtra {
        id: u64,
        #[source]
        source: ExtraError,
    },

    #[error("Rule cache lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from parsing an application's workspace extra blob.
#[derive(Debug, Error)]
pub enum ExtraError {
    #[error("Extra is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Extra must be a JSON object")]
    NotAnObject,

    #[error("Extra key '{key}' references unknown workspace")]
    UnknownWorkspace { key: String },

    #[error("Extra key '{key}' must hold a string")]
    InvalidValue { key: String },
}
