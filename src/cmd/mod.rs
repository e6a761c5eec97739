//! CLI command implementations.
//!
//! | Module      | Commands handled                                    |
//! |-------------|-----------------------------------------------------|
//! | `reference` | `Classify`, `Prefix`, `Prefixes`, `Match`           |
//! | `resolve`   | `Resolve`, `CheckWorkspace`, `Workspaces`, `Namespace` |
//! | `config`    | `Config`                                            |

pub mod config;
pub mod reference;
pub mod resolve;

pub use config::cmd_config;
pub use reference::{cmd_classify, cmd_match, cmd_prefix, cmd_prefixes};
pub use resolve::{cmd_check_workspace, cmd_namespace, cmd_resolve, cmd_workspaces};
