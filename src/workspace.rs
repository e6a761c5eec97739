//! Deployment workspaces and typed workspace sets.
//!
//! Stored rules keep workspaces as comma lists (`"DEV,TEST"`). They are parsed
//! into a [`WorkspaceSet`] once, when a rule is compiled, so resolution never
//! splits strings.

use crate::errors::ParseWorkspaceError;
use serde::{Deserialize, Serialize};

/// A deployment environment tier.
///
/// | Workspace | Typical source branches      |
/// |-----------|------------------------------|
/// | `Dev`     | `feature/*`                  |
/// | `Test`    | `develop`                    |
/// | `Staging` | `release/*`                  |
/// | `Prod`    | `master`, `hotfix/*`, `support/*` |
///
/// `Default` is an internal sentinel for "no extra namespace configured"; it
/// is never a valid rule target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Workspace {
    Dev,
    Test,
    Staging,
    Prod,
    #[default]
    Default,
}

impl Workspace {
    /// The four workspaces a branch can deploy to.
    pub const DEPLOYABLE: [Workspace; 4] = [
        Workspace::Dev,
        Workspace::Test,
        Workspace::Staging,
        Workspace::Prod,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Workspace::Dev => "DEV",
            Workspace::Test => "TEST",
            Workspace::Staging => "STAGING",
            Workspace::Prod => "PROD",
            Workspace::Default => "DEFAULT",
        }
    }

    pub fn is_deployable(self) -> bool {
        self != Workspace::Default
    }
}

impl std::fmt::Display for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Workspace {
    type Err = ParseWorkspaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEV" => Ok(Workspace::Dev),
            "TEST" => Ok(Workspace::Test),
            "STAGING" => Ok(Workspace::Staging),
            "PROD" => Ok(Workspace::Prod),
            "DEFAULT" => Ok(Workspace::Default),
            _ => Err(ParseWorkspaceError(s.to_string())),
        }
    }
}

/// Ordered, duplicate-free set of workspaces.
///
/// Keeps the order in which workspaces were configured so that expansions
/// stay stable with respect to the stored rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceSet(Vec<Workspace>);

impl WorkspaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma list such as `"DEV, TEST"`. Empty entries are skipped.
    pub fn parse(list: &str) -> Result<Self, ParseWorkspaceError> {
        let mut set = Self::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            set.insert(entry.parse()?);
        }
        Ok(set)
    }

    /// Insert a workspace if absent. Returns whether it was added.
    pub fn insert(&mut self, workspace: Workspace) -> bool {
        if self.0.contains(&workspace) {
            return false;
        }
        self.0.push(workspace);
        true
    }

    pub fn contains(&self, workspace: Workspace) -> bool {
        self.0.contains(&workspace)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First configured workspace, if any.
    pub fn first(&self) -> Option<Workspace> {
        self.0.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Workspace> + '_ {
        self.0.iter().copied()
    }
}

impl From<Workspace> for WorkspaceSet {
    fn from(workspace: Workspace) -> Self {
        Self(vec![workspace])
    }
}

impl FromIterator<Workspace> for WorkspaceSet {
    fn from_iter<I: IntoIterator<Item = Workspace>>(iter: I) -> Self {
        let mut set = Self::new();
        for workspace in iter {
            set.insert(workspace);
        }
        set
    }
}

impl std::fmt::Display for WorkspaceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, workspace) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(workspace.as_str())?;
        }
        Ok(())
    }
}

impl Serialize for WorkspaceSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WorkspaceSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        WorkspaceSet::parse(&raw).map_err(serde::de::Error::custom)
    }
}
