//! Rules file view and validation commands : `branchrule config`.

use anyhow::Result;

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    use branchrule::config::{RulesToml, default_rules_toml, get_config_dir, get_config_path};

    let config_dir = get_config_dir(project_dir);
    let config_path = get_config_path(project_dir);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Branch Rules");
            println!("============");
            println!();

            if !config_path.exists() {
                println!("No rules.toml found at {}", config_path.display());
                println!();
                println!("Using the git-flow defaults:");
                for entry in branchrule::gitflow::list_all_branch_prefix() {
                    println!("  {:<12} -> {}", entry.pattern, entry.workspace);
                }
                println!();
                println!("Run 'branchrule config init' to create a rules.toml file.");
                println!();
                return Ok(());
            }

            println!("Rules file: {}", config_path.display());
            println!();

            let toml = RulesToml::load(&config_path)?;
            println!("[settings]");
            println!("  cache_ttl_secs = {}", toml.settings.cache_ttl_secs);
            println!();

            for rule in &toml.rules {
                println!("[{} {}] {}", rule.scope, rule.scope_id, rule.pattern);
                println!("  workspace = \"{}\"", rule.workspace);
                if !rule.artifact_workspace.is_empty() {
                    println!("  artifact_workspace = \"{}\"", rule.artifact_workspace);
                }
                if let Some(priority) = rule.priority {
                    println!("  priority = {}", priority);
                }
                println!(
                    "  protected = {}, trigger_pipeline = {}, need_approval = {}",
                    rule.is_protected, rule.is_trigger_pipeline, rule.need_approval
                );
            }

            if !toml.applications.is_empty() {
                println!();
                for app in &toml.applications {
                    println!("application {} -> project {}", app.id, app.project_id);
                }
            }

            println!();
            println!("Effective values (with env overrides):");
            println!("  cache_ttl = {}s", toml.cache_ttl().as_secs());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating rules...");
            println!();

            if !config_path.exists() {
                println!("No rules.toml found. Using git-flow defaults (valid).");
                return Ok(());
            }

            let toml = RulesToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Rules are valid.");
            } else {
                println!("Rule warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("rules.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)?;
            }

            std::fs::write(&config_path, default_rules_toml())?;

            println!("Created rules.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [settings] cache_ttl_secs");
            println!("  - [[rules]] pattern, workspace, artifact_workspace and policy flags");
            println!("  - [[applications]] id, project_id, extra");
            println!();
        }
    }

    Ok(())
}
