//! Branch rule records and their compiled form.
//!
//! A [`BranchRule`] is what storage holds: comma-separated pattern and
//! workspace fields plus policy flags. Compiling it into a [`CompiledRule`]
//! parses every list once; a [`RuleSet`] is the ordered collection the
//! resolver walks.

use crate::errors::RuleError;
use crate::pattern::{RefPattern, parse_pattern_list};
use crate::workspace::{Workspace, WorkspaceSet};
use serde::{Deserialize, Serialize};

/// Owner of a branch rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    Project,
    Application,
}

impl std::fmt::Display for RuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleScope::Project => write!(f, "project"),
            RuleScope::Application => write!(f, "application"),
        }
    }
}

impl std::str::FromStr for RuleScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project" => Ok(RuleScope::Project),
            "application" | "app" => Ok(RuleScope::Application),
            _ => anyhow::bail!(
                "Invalid rule scope '{}'. Valid values: project, application",
                s
            ),
        }
    }
}

/// A branch rule as persisted by the project configuration service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRule {
    pub scope: RuleScope,
    pub scope_id: u64,
    /// Comma-separated branch patterns, e.g. `"feature/*,bugfix/*"`
    pub pattern: String,
    /// Comma-separated workspaces this pattern deploys to
    #[serde(default)]
    pub workspace: String,
    /// Comma-separated workspaces for which built artifacts are valid
    #[serde(default)]
    pub artifact_workspace: String,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub is_trigger_pipeline: bool,
    #[serde(default)]
    pub need_approval: bool,
    /// Lower values take precedence; unset is 0. Equal priorities keep
    /// stored order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl BranchRule {
    /// Create a rule for `pattern` deploying to `workspace`, with no flags.
    pub fn new(
        scope: RuleScope,
        scope_id: u64,
        pattern: impl Into<String>,
        workspace: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            scope_id,
            pattern: pattern.into(),
            workspace: workspace.into(),
            artifact_workspace: String::new(),
            is_protected: false,
            is_trigger_pipeline: false,
            need_approval: false,
            priority: None,
        }
    }

    pub fn with_artifact_workspace(mut self, artifact_workspace: impl Into<String>) -> Self {
        self.artifact_workspace = artifact_workspace.into();
        self
    }

    pub fn protected(mut self) -> Self {
        self.is_protected = true;
        self
    }

    pub fn trigger_pipeline(mut self) -> Self {
        self.is_trigger_pipeline = true;
        self
    }

    pub fn need_approval(mut self) -> Self {
        self.need_approval = true;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Parse the comma-separated fields into typed form.
    pub fn compile(&self) -> Result<CompiledRule, RuleError> {
        Ok(CompiledRule {
            scope: self.scope,
            scope_id: self.scope_id,
            name: self.pattern.trim().to_string(),
            patterns: parse_pattern_list(&self.pattern),
            workspace: self.parse_workspaces(&self.workspace)?,
            artifact_workspace: self.parse_workspaces(&self.artifact_workspace)?,
            is_protected: self.is_protected,
            is_trigger_pipeline: self.is_trigger_pipeline,
            need_approval: self.need_approval,
            priority: self.priority.unwrap_or(0),
        })
    }

    fn parse_workspaces(&self, list: &str) -> Result<WorkspaceSet, RuleError> {
        let set = WorkspaceSet::parse(list).map_err(|e| RuleError::UnknownWorkspace {
            pattern: self.pattern.clone(),
            value: e.0.trim().to_string(),
        })?;
        if set.contains(Workspace::Default) {
            return Err(RuleError::ReservedWorkspace {
                pattern: self.pattern.clone(),
            });
        }
        Ok(set)
    }
}

/// A branch rule with every list parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    pub scope: RuleScope,
    pub scope_id: u64,
    /// Pattern field as configured, used as the display name of a match
    pub name: String,
    pub patterns: Vec<RefPattern>,
    pub workspace: WorkspaceSet,
    pub artifact_workspace: WorkspaceSet,
    pub is_protected: bool,
    pub is_trigger_pipeline: bool,
    pub need_approval: bool,
    pub priority: i32,
}

impl CompiledRule {
    pub fn matches(&self, reference: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(reference))
    }

    pub fn to_valid_branch(&self) -> ValidBranch {
        ValidBranch {
            name: self.name.clone(),
            workspace: self.workspace.clone(),
            artifact_workspace: self.artifact_workspace.clone(),
            is_protected: self.is_protected,
            is_trigger_pipeline: self.is_trigger_pipeline,
            need_approval: self.need_approval,
        }
    }
}

/// Rules in precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile stored rules and order them by priority. The sort is stable,
    /// so rules with equal priority keep their stored order.
    pub fn compile(rules: &[BranchRule]) -> Result<Self, RuleError> {
        let compiled = rules
            .iter()
            .map(BranchRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_compiled(compiled))
    }

    pub fn from_compiled(mut rules: Vec<CompiledRule>) -> Self {
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Rules of `self` followed by those of `other`, re-ordered by priority.
    pub fn chain(self, other: RuleSet) -> Self {
        let mut rules = self.rules;
        rules.extend(other.rules);
        Self::from_compiled(rules)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a CompiledRule;
    type IntoIter = std::slice::Iter<'a, CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// The effective workspace and policy flags for a reference.
///
/// The default value has an empty workspace: no rule matched and the
/// reference must not be deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidBranch {
    /// Matched pattern, empty when nothing matched
    pub name: String,
    pub workspace: WorkspaceSet,
    pub artifact_workspace: WorkspaceSet,
    pub is_protected: bool,
    pub is_trigger_pipeline: bool,
    pub need_approval: bool,
}

impl ValidBranch {
    /// Whether a rule or the default table produced a workspace.
    pub fn is_deployable(&self) -> bool {
        !self.workspace.is_empty()
    }

    /// First configured workspace, the one a single deployment targets.
    pub fn primary_workspace(&self) -> Option<Workspace> {
        self.workspace.first()
    }
}

/// One configured `pattern : workspace` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchWorkspaceMapping {
    pub pattern: String,
    pub workspace: Workspace,
    pub scope: RuleScope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_scope_from_str() {
        assert_eq!("project".parse::<RuleScope>().unwrap(), RuleScope::Project);
        assert_eq!("APP".parse::<RuleScope>().unwrap(), RuleScope::Application);
        assert!("org".parse::<RuleScope>().is_err());
    }

    #[test]
    fn test_compile_parses_lists() {
        let rule = BranchRule::new(RuleScope::Project, 1, "feature/*, bugfix/*", "DEV,TEST")
            .with_artifact_workspace("DEV")
            .trigger_pipeline();
        let compiled = rule.compile().unwrap();

        assert_eq!(compiled.patterns.len(), 2);
        assert!(compiled.workspace.contains(Workspace::Test));
        assert_eq!(compiled.artifact_workspace.to_string(), "DEV");
        assert!(compiled.is_trigger_pipeline);
        assert_eq!(compiled.priority, 0);
        assert!(compiled.matches("bugfix/x"));
        assert!(!compiled.matches("master"));
    }

    #[test]
    fn test_compile_unknown_workspace() {
        let rule = BranchRule::new(RuleScope::Project, 1, "master", "PROD, UAT");
        let err = rule.compile().unwrap_err();
        assert_eq!(
            err,
            RuleError::UnknownWorkspace {
                pattern: "master".into(),
                value: "UAT".into(),
            }
        );
    }

    #[test]
    fn test_compile_rejects_default_sentinel() {
        let rule = BranchRule::new(RuleScope::Project, 1, "master", "PROD")
            .with_artifact_workspace("DEFAULT");
        assert!(matches!(
            rule.compile(),
            Err(RuleError::ReservedWorkspace { .. })
        ));
    }

    #[test]
    fn test_rule_set_orders_by_priority_stably() {
        let rules = vec![
            BranchRule::new(RuleScope::Project, 1, "a", "DEV"),
            BranchRule::new(RuleScope::Project, 1, "b", "DEV").with_priority(-1),
            BranchRule::new(RuleScope::Project, 1, "c", "DEV"),
            BranchRule::new(RuleScope::Project, 1, "d", "DEV").with_priority(5),
        ];
        let set = RuleSet::compile(&rules).unwrap();
        let names: Vec<_> = set.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_valid_branch_default_is_not_deployable() {
        let branch = ValidBranch::default();
        assert!(!branch.is_deployable());
        assert_eq!(branch.primary_workspace(), None);
    }

    #[test]
    fn test_branch_rule_toml_defaults() {
        let rule: BranchRule = toml::from_str(
            r#"
            scope = "application"
            scope_id = 3
            pattern = "develop"
            workspace = "TEST"
            "#,
        )
        .unwrap();
        assert_eq!(rule.scope, RuleScope::Application);
        assert!(rule.artifact_workspace.is_empty());
        assert!(!rule.need_approval);
        assert_eq!(rule.priority, None);
    }
}
