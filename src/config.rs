//! Rules file for the `branchrule` CLI.
//!
//! Reads `.branchrule/rules.toml` under the project directory:
//!
//! ```toml
//! [settings]
//! cache_ttl_secs = 60
//!
//! [[rules]]
//! scope = "project"
//! scope_id = 1
//! pattern = "release/*"
//! workspace = "STAGING"
//! artifact_workspace = "STAGING,PROD"
//! need_approval = true
//!
//! [[applications]]
//! id = 10
//! project_id = 1
//! extra = '{"DEV.configNamespace": "app-10-dev"}'
//! ```

use crate::extra::WorkspaceExtras;
use crate::rule::{BranchRule, RuleScope};
use crate::store::ApplicationRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_DIR: &str = ".branchrule";
pub const CONFIG_FILE: &str = "rules.toml";

/// Environment variable overriding `settings.cache_ttl_secs`.
pub const CACHE_TTL_ENV: &str = "BRANCHRULE_CACHE_TTL";

pub fn get_config_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_DIR)
}

pub fn get_config_path(project_dir: &Path) -> PathBuf {
    get_config_dir(project_dir).join(CONFIG_FILE)
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSection {
    /// How long fetched rules stay cached; 0 disables caching
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    60
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// The complete rules.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesToml {
    #[serde(default)]
    pub settings: SettingsSection,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<BranchRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<ApplicationRecord>,
}

impl RulesToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse rules.toml")
    }

    /// Load from `<project>/.branchrule/rules.toml`, or defaults if absent.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let path = get_config_path(project_dir);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize rules.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write rules file: {}", path.display()))?;
        Ok(())
    }

    /// Cache TTL, with the environment variable taking precedence.
    pub fn cache_ttl(&self) -> Duration {
        let secs = std::env::var(CACHE_TTL_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(self.settings.cache_ttl_secs);
        Duration::from_secs(secs)
    }

    /// Validate the file and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for rule in &self.rules {
            let label = format!("{} {} rule '{}'", rule.scope, rule.scope_id, rule.pattern);
            match rule.compile() {
                Ok(compiled) => {
                    if compiled.patterns.is_empty() {
                        warnings.push(format!("{label} has no patterns and matches nothing"));
                    }
                    if compiled.workspace.is_empty() {
                        warnings.push(format!("{label} has no workspace and is never deployable"));
                    }
                }
                Err(e) => warnings.push(format!("{label} is invalid: {e}")),
            }
        }

        let projects: HashSet<u64> = self
            .rules
            .iter()
            .filter(|r| r.scope == RuleScope::Project)
            .map(|r| r.scope_id)
            .collect();
        let mut app_ids = HashSet::new();

        for app in &self.applications {
            if !app_ids.insert(app.id) {
                warnings.push(format!("Application {} is declared more than once", app.id));
            }
            if !projects.contains(&app.project_id) {
                warnings.push(format!(
                    "Application {} belongs to project {} which has no rules; the git-flow defaults apply",
                    app.id, app.project_id
                ));
            }
            if let Some(ref extra) = app.extra
                && let Err(e) = WorkspaceExtras::parse(extra)
            {
                warnings.push(format!("Application {} has an invalid extra: {}", app.id, e));
            }
        }

        for rule in self
            .rules
            .iter()
            .filter(|r| r.scope == RuleScope::Application)
        {
            if !self.applications.iter().any(|a| a.id == rule.scope_id) {
                warnings.push(format!(
                    "Rule '{}' targets undeclared application {}",
                    rule.pattern, rule.scope_id
                ));
            }
        }

        warnings
    }
}

/// Starter rules file mirroring the git-flow defaults.
pub fn default_rules_toml() -> String {
    r#"# branchrule rules file
#
# Rules are matched in order (lower `priority` first); the first match wins.
# Branches matching no rule fall back to the git-flow defaults:
#   master, hotfix/*, support/* -> PROD
#   release/*                   -> STAGING
#   develop                     -> TEST
#   feature/*                   -> DEV

[settings]
cache_ttl_secs = 60

[[rules]]
scope = "project"
scope_id = 1
pattern = "master,support/*,hotfix/*"
workspace = "PROD"
artifact_workspace = "PROD"
is_protected = true
need_approval = true

[[rules]]
scope = "project"
scope_id = 1
pattern = "release/*"
workspace = "STAGING"
artifact_workspace = "STAGING,PROD"
is_trigger_pipeline = true

[[rules]]
scope = "project"
scope_id = 1
pattern = "develop"
workspace = "TEST"
artifact_workspace = "TEST"
is_trigger_pipeline = true

[[rules]]
scope = "project"
scope_id = 1
pattern = "feature/*"
workspace = "DEV"
artifact_workspace = "DEV"
is_trigger_pipeline = true
"#
    .to_string()
}
