//! Typed per-workspace settings from an application's extra blob.
//!
//! The application service stores extras as a flat JSON object keyed by
//! `<WORKSPACE>.<field>`:
//!
//! ```json
//! {
//!   "DEV.configNamespace": "app-10-dev",
//!   "PROD.configNamespace": "app-10-prod",
//!   "owner": "team-a"
//! }
//! ```
//!
//! Keys without a `.` and unknown fields are ignored.

use crate::errors::ExtraError;
use crate::workspace::Workspace;
use std::collections::HashMap;

const CONFIG_NAMESPACE_FIELD: &str = "configNamespace";

/// Extra settings for one workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceExtra {
    pub workspace: Workspace,
    pub config_namespace: String,
}

/// All workspace extras of one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceExtras {
    entries: HashMap<Workspace, WorkspaceExtra>,
}

impl WorkspaceExtras {
    /// Parse an extra blob from its JSON text.
    pub fn parse(json: &str) -> Result<Self, ExtraError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self, ExtraError> {
        let object = value.as_object().ok_or(ExtraError::NotAnObject)?;
        let mut entries = HashMap::new();

        for (key, value) in object {
            let Some((workspace, field)) = key.split_once('.') else {
                continue;
            };
            let workspace = workspace
                .parse::<Workspace>()
                .ok()
                .filter(|w| w.is_deployable())
                .ok_or_else(|| ExtraError::UnknownWorkspace { key: key.clone() })?;

            if field != CONFIG_NAMESPACE_FIELD {
                continue;
            }
            let namespace = value
                .as_str()
                .ok_or_else(|| ExtraError::InvalidValue { key: key.clone() })?;

            entries.insert(
                workspace,
                WorkspaceExtra {
                    workspace,
                    config_namespace: namespace.to_string(),
                },
            );
        }

        Ok(Self { entries })
    }

    /// Extra for a workspace, or the `DEFAULT` sentinel when none is set.
    pub fn lookup(&self, workspace: Workspace) -> WorkspaceExtra {
        self.entries.get(&workspace).cloned().unwrap_or_default()
    }

    pub fn config_namespace(&self, workspace: Workspace) -> Option<&str> {
        self.entries
            .get(&workspace)
            .map(|e| e.config_namespace.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
