//! Rule resolution over a rule store.
//!
//! [`RuleService`] fetches the stored rules of a project or application,
//! compiles them and hands them to the pure resolver. An application inherits
//! its project's rules: its own rules come first, then the project's.

use crate::errors::StoreError;
use crate::extra::{WorkspaceExtra, WorkspaceExtras};
use crate::gitflow::short_reference;
use crate::resolver;
use crate::rule::{BranchRule, BranchWorkspaceMapping, RuleScope, RuleSet, ValidBranch};
use crate::store::RuleStore;
use crate::workspace::Workspace;

/// Whose rules to resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Project(u64),
    Application(u64),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Project(id) => write!(f, "project {}", id),
            Target::Application(id) => write!(f, "application {}", id),
        }
    }
}

pub struct RuleService<S> {
    store: S,
}

impl<S: RuleStore> RuleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn project_rules(&self, project_id: u64) -> Result<RuleSet, StoreError> {
        let rules = self.store.branch_rules(RuleScope::Project, project_id)?;
        compile(RuleScope::Project, project_id, &rules)
    }

    /// The application's own rules followed by its project's rules.
    pub fn application_rules(&self, app_id: u64) -> Result<RuleSet, StoreError> {
        let app = self.store.application(app_id)?;
        let own = self.store.branch_rules(RuleScope::Application, app_id)?;
        let own = compile(RuleScope::Application, app_id, &own)?;
        Ok(own.chain(self.project_rules(app.project_id)?))
    }

    pub fn rules_for(&self, target: Target) -> Result<RuleSet, StoreError> {
        match target {
            Target::Project(id) => self.project_rules(id),
            Target::Application(id) => self.application_rules(id),
        }
    }

    /// Resolve a branch or tag. Full refs (`refs/heads/..`) are shortened.
    pub fn resolve(&self, target: Target, reference: &str) -> Result<ValidBranch, StoreError> {
        let rules = self.rules_for(target)?;
        let reference = short_reference(reference);
        let branch = resolver::get_valid_branch_by_git_reference(reference, &rules);

        if branch.is_deployable() {
            tracing::debug!(
                %target,
                reference,
                rule = %branch.name,
                workspace = %branch.workspace,
                need_approval = branch.need_approval,
                "resolved branch rule"
            );
        } else {
            tracing::debug!(%target, reference, "no branch rule matched");
        }
        Ok(branch)
    }

    /// `(valid_workspace, valid_artifact_workspace)` for a user-selected
    /// workspace.
    pub fn validate_workspace(
        &self,
        target: Target,
        workspace: Workspace,
    ) -> Result<(bool, bool), StoreError> {
        let rules = self.rules_for(target)?;
        Ok(resolver::is_valid_branch_workspace(&rules, workspace))
    }

    pub fn all_valid_branch_workspaces(
        &self,
        app_id: u64,
    ) -> Result<Vec<BranchWorkspaceMapping>, StoreError> {
        let rules = self.application_rules(app_id)?;
        Ok(resolver::get_all_valid_branch_workspaces(&rules))
    }

    /// Extra settings of an application for one workspace.
    pub fn workspace_extra(
        &self,
        app_id: u64,
        workspace: Workspace,
    ) -> Result<WorkspaceExtra, StoreError> {
        let app = self.store.application(app_id)?;
        let Some(raw) = app.extra.as_deref() else {
            return Ok(WorkspaceExtra::default());
        };
        let extras = WorkspaceExtras::parse(raw).map_err(|source| {
            tracing::warn!(app_id, error = %source, "invalid application extra");
            StoreError::InvalidExtra { id: app_id, source }
        })?;
        Ok(extras.lookup(workspace))
    }
}

fn compile(scope: RuleScope, scope_id: u64, rules: &[BranchRule]) -> Result<RuleSet, StoreError> {
    RuleSet::compile(rules).map_err(|source| {
        tracing::warn!(%scope, scope_id, error = %source, "branch rule failed to compile");
        StoreError::InvalidRule {
            scope,
            scope_id,
            source,
        }
    })
}
