//! Git-flow reference classification.
//!
//! Recognises the git-flow branch kinds and semantic-version release tags, and
//! carries the default branch-to-workspace table used when no project rule
//! applies.

use crate::errors::UnsupportedReferenceError;
use crate::workspace::Workspace;
use regex::Regex;
use std::sync::LazyLock;

pub const MASTER: &str = "master";
pub const DEVELOP: &str = "develop";
pub const HOTFIX_PREFIX: &str = "hotfix/";
pub const SUPPORT_PREFIX: &str = "support/";
pub const RELEASE_PREFIX: &str = "release/";
pub const FEATURE_PREFIX: &str = "feature/";

// Semantic versioning 2.0.0 with an optional leading `v`
static RELEASE_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^v?(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)",
        r"(?:-((?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)",
        r"(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    ))
    .unwrap()
});

/// The git-flow kind of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Master,
    Hotfix,
    Support,
    Release,
    Develop,
    Feature,
    ReleaseTag,
    Invalid,
}

impl BranchKind {
    /// Canonical short label, `None` for `Invalid`.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            BranchKind::Master => Some("master"),
            BranchKind::Hotfix => Some("hotfix"),
            BranchKind::Support => Some("support"),
            BranchKind::Release => Some("release"),
            BranchKind::Develop => Some("develop"),
            BranchKind::Feature => Some("feature"),
            BranchKind::ReleaseTag => Some("tag"),
            BranchKind::Invalid => None,
        }
    }

    /// Workspace from the default git-flow table. Release tags and invalid
    /// references have none.
    pub fn default_workspace(self) -> Option<Workspace> {
        BRANCH_PREFIXES
            .iter()
            .find(|p| p.kind == self)
            .map(|p| p.workspace)
    }
}

impl std::fmt::Display for BranchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchKind::Master => write!(f, "master"),
            BranchKind::Hotfix => write!(f, "hotfix"),
            BranchKind::Support => write!(f, "support"),
            BranchKind::Release => write!(f, "release"),
            BranchKind::Develop => write!(f, "develop"),
            BranchKind::Feature => write!(f, "feature"),
            BranchKind::ReleaseTag => write!(f, "release-tag"),
            BranchKind::Invalid => write!(f, "invalid"),
        }
    }
}

fn has_prefix_and_suffix(name: &str, prefix: &str) -> bool {
    name.len() > prefix.len() && name.starts_with(prefix)
}

pub fn is_master(name: &str) -> bool {
    name == MASTER
}

pub fn is_develop(name: &str) -> bool {
    name == DEVELOP
}

/// `hotfix/` followed by at least one character.
pub fn is_hotfix(name: &str) -> bool {
    has_prefix_and_suffix(name, HOTFIX_PREFIX)
}

pub fn is_support(name: &str) -> bool {
    has_prefix_and_suffix(name, SUPPORT_PREFIX)
}

pub fn is_release(name: &str) -> bool {
    has_prefix_and_suffix(name, RELEASE_PREFIX)
}

pub fn is_feature(name: &str) -> bool {
    has_prefix_and_suffix(name, FEATURE_PREFIX)
}

/// Semantic version tag such as `v1.2.3`, `1.2.3-rc.1` or `1.2.3+build.5`.
pub fn is_release_tag(name: &str) -> bool {
    RELEASE_TAG_REGEX.is_match(name)
}

/// Classify a reference into its git-flow kind.
pub fn classify(reference: &str) -> BranchKind {
    if is_master(reference) {
        BranchKind::Master
    } else if is_hotfix(reference) {
        BranchKind::Hotfix
    } else if is_support(reference) {
        BranchKind::Support
    } else if is_release(reference) {
        BranchKind::Release
    } else if is_develop(reference) {
        BranchKind::Develop
    } else if is_feature(reference) {
        BranchKind::Feature
    } else if is_release_tag(reference) {
        BranchKind::ReleaseTag
    } else {
        BranchKind::Invalid
    }
}

/// Whether a reference is a git-flow branch or a release tag.
pub fn is_valid(reference: &str) -> bool {
    is_master(reference)
        || is_hotfix(reference)
        || is_support(reference)
        || is_release(reference)
        || is_release_tag(reference)
        || is_develop(reference)
        || is_feature(reference)
}

/// Canonical short label for a reference's kind.
pub fn get_reference_prefix(reference: &str) -> Result<&'static str, UnsupportedReferenceError> {
    classify(reference)
        .prefix()
        .ok_or_else(|| UnsupportedReferenceError::new(reference))
}

/// One row of the default git-flow table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchPrefix {
    /// Pattern form, e.g. `feature/*` or `master`
    pub pattern: &'static str,
    pub kind: BranchKind,
    pub workspace: Workspace,
}

impl BranchPrefix {
    /// Whether the pattern is an exact branch name rather than a prefix.
    pub fn is_exact(&self) -> bool {
        !self.pattern.ends_with("/*")
    }
}

static BRANCH_PREFIXES: [BranchPrefix; 6] = [
    BranchPrefix {
        pattern: "master",
        kind: BranchKind::Master,
        workspace: Workspace::Prod,
    },
    BranchPrefix {
        pattern: "hotfix/*",
        kind: BranchKind::Hotfix,
        workspace: Workspace::Prod,
    },
    BranchPrefix {
        pattern: "support/*",
        kind: BranchKind::Support,
        workspace: Workspace::Prod,
    },
    BranchPrefix {
        pattern: "release/*",
        kind: BranchKind::Release,
        workspace: Workspace::Staging,
    },
    BranchPrefix {
        pattern: "develop",
        kind: BranchKind::Develop,
        workspace: Workspace::Test,
    },
    BranchPrefix {
        pattern: "feature/*",
        kind: BranchKind::Feature,
        workspace: Workspace::Dev,
    },
];

/// The default git-flow branch-to-workspace table.
pub fn list_all_branch_prefix() -> &'static [BranchPrefix] {
    &BRANCH_PREFIXES
}

/// Default-table row for a reference, if its kind has one.
pub fn default_branch_prefix(reference: &str) -> Option<&'static BranchPrefix> {
    let kind = classify(reference);
    BRANCH_PREFIXES.iter().find(|p| p.kind == kind)
}

pub fn default_workspace(reference: &str) -> Option<Workspace> {
    classify(reference).default_workspace()
}

/// Strip `refs/heads/` or `refs/tags/` from a full git ref.
pub fn short_reference(reference: &str) -> &str {
    reference
        .strip_prefix("refs/heads/")
        .or_else(|| reference.strip_prefix("refs/tags/"))
        .unwrap_or(reference)
}
