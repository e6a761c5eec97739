//! Rule resolution commands : `branchrule resolve|check-workspace|workspaces|namespace`.

use anyhow::{Context, Result};
use branchrule::cache::CachedRuleStore;
use branchrule::config::{RulesToml, get_config_path};
use branchrule::service::{RuleService, Target};
use branchrule::store::MemoryRuleStore;
use branchrule::workspace::Workspace;
use std::path::Path;

type Service = RuleService<CachedRuleStore<MemoryRuleStore>>;

fn open_service(project_dir: &Path) -> Result<Service> {
    let config = RulesToml::load_or_default(project_dir)?;
    tracing::debug!(
        path = %get_config_path(project_dir).display(),
        rules = config.rules.len(),
        applications = config.applications.len(),
        "loaded rules file"
    );
    let store = CachedRuleStore::new(MemoryRuleStore::from_config(&config), config.cache_ttl());
    Ok(RuleService::new(store))
}

fn parse_workspace(raw: &str) -> Result<Workspace> {
    let workspace: Workspace = raw.parse()?;
    if !workspace.is_deployable() {
        anyhow::bail!("Workspace DEFAULT is internal and cannot be selected");
    }
    Ok(workspace)
}

pub fn cmd_resolve(project_dir: &Path, reference: &str, target: Target, json: bool) -> Result<()> {
    let service = open_service(project_dir)?;
    let branch = service
        .resolve(target, reference)
        .with_context(|| format!("Failed to resolve '{}' for {}", reference, target))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&branch)?);
        return Ok(());
    }

    if !branch.is_deployable() {
        println!("No branch rule for '{}' in {}", reference, target);
        return Ok(());
    }

    println!("rule:                {}", branch.name);
    println!("workspace:           {}", branch.workspace);
    println!("artifact_workspace:  {}", branch.artifact_workspace);
    println!("is_protected:        {}", branch.is_protected);
    println!("is_trigger_pipeline: {}", branch.is_trigger_pipeline);
    println!("need_approval:       {}", branch.need_approval);
    Ok(())
}

pub fn cmd_check_workspace(
    project_dir: &Path,
    workspace: &str,
    target: Target,
    json: bool,
) -> Result<()> {
    let workspace = parse_workspace(workspace)?;
    let service = open_service(project_dir)?;
    let (valid, valid_artifact) = service.validate_workspace(target, workspace)?;

    if json {
        let value = serde_json::json!({
            "workspace": workspace,
            "valid_workspace": valid,
            "valid_artifact_workspace": valid_artifact,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("workspace {} in {}:", workspace, target);
    println!("  valid workspace:          {}", valid);
    println!("  valid artifact workspace: {}", valid_artifact);
    Ok(())
}

pub fn cmd_workspaces(project_dir: &Path, app_id: u64, json: bool) -> Result<()> {
    let service = open_service(project_dir)?;
    let mappings = service.all_valid_branch_workspaces(app_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&mappings)?);
        return Ok(());
    }

    if mappings.is_empty() {
        println!("No branch rules configured for application {}", app_id);
        return Ok(());
    }
    for mapping in &mappings {
        println!(
            "{:<24} {:<8} ({})",
            mapping.pattern, mapping.workspace, mapping.scope
        );
    }
    Ok(())
}

pub fn cmd_namespace(project_dir: &Path, app_id: u64, workspace: &str) -> Result<()> {
    let workspace = parse_workspace(workspace)?;
    let service = open_service(project_dir)?;
    let extra = service.workspace_extra(app_id, workspace)?;

    if extra.workspace.is_deployable() {
        println!("{}", extra.config_namespace);
    } else {
        println!("{} (no namespace configured)", extra.workspace);
    }
    Ok(())
}
