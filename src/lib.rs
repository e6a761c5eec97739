pub mod cache;
pub mod config;
pub mod errors;
pub mod extra;
pub mod gitflow;
pub mod pattern;
pub mod resolver;
pub mod rule;
pub mod service;
pub mod store;
pub mod workspace;

pub use errors::{RuleError, StoreError, UnsupportedReferenceError};
pub use gitflow::{BranchKind, classify, get_reference_prefix, is_valid, list_all_branch_prefix};
pub use pattern::is_ref_pattern_match;
pub use resolver::{
    get_all_valid_branch_workspaces, get_valid_branch_by_git_reference, is_valid_branch_workspace,
};
pub use rule::{BranchRule, BranchWorkspaceMapping, RuleScope, RuleSet, ValidBranch};
pub use workspace::{Workspace, WorkspaceSet};
