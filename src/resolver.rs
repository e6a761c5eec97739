//! Workspace rule resolution.
//!
//! All functions here are total: a miss yields an empty [`ValidBranch`] or
//! `false`, never an error. Callers decide what "no rule" means for them.

use crate::gitflow::default_branch_prefix;
use crate::rule::{BranchWorkspaceMapping, RuleSet, ValidBranch};
use crate::workspace::{Workspace, WorkspaceSet};
use std::collections::HashSet;

/// Resolve the effective workspace and policy flags for a branch.
///
/// The first rule (in precedence order) whose patterns match wins. With no
/// matching rule the default git-flow table applies, with every policy flag
/// off. A reference the table does not know resolves to the empty value.
pub fn get_valid_branch_by_git_reference(branch: &str, rules: &RuleSet) -> ValidBranch {
    if let Some(rule) = rules.iter().find(|r| r.matches(branch)) {
        return rule.to_valid_branch();
    }

    match default_branch_prefix(branch) {
        Some(entry) => ValidBranch {
            name: entry.pattern.to_string(),
            workspace: WorkspaceSet::from(entry.workspace),
            artifact_workspace: WorkspaceSet::from(entry.workspace),
            ..ValidBranch::default()
        },
        None => ValidBranch::default(),
    }
}

/// Check whether any rule lists `expect` as a workspace and, independently,
/// as an artifact workspace.
///
/// Returns `(valid_workspace, valid_artifact_workspace)`.
pub fn is_valid_branch_workspace(rules: &RuleSet, expect: Workspace) -> (bool, bool) {
    let mut valid_workspace = false;
    let mut valid_artifact_workspace = false;

    for rule in rules {
        if !valid_workspace && rule.workspace.contains(expect) {
            valid_workspace = true;
        }
        if !valid_artifact_workspace && rule.artifact_workspace.contains(expect) {
            valid_artifact_workspace = true;
        }
        if valid_workspace && valid_artifact_workspace {
            break;
        }
    }

    (valid_workspace, valid_artifact_workspace)
}

/// Expand every rule into discrete `pattern : workspace` pairs.
///
/// Order follows rule precedence, then the configured order of patterns and
/// workspaces within a rule. A repeated pair keeps its first occurrence.
pub fn get_all_valid_branch_workspaces(rules: &RuleSet) -> Vec<BranchWorkspaceMapping> {
    let mut seen = HashSet::new();
    let mut mappings = Vec::new();

    for rule in rules {
        for pattern in &rule.patterns {
            let pattern = pattern.to_string();
            for workspace in rule.workspace.iter() {
                if seen.insert((pattern.clone(), workspace)) {
                    mappings.push(BranchWorkspaceMapping {
                        pattern: pattern.clone(),
                        workspace,
                        scope: rule.scope,
                    });
                }
            }
        }
    }

    mappings
}
