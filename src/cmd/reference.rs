//! Reference inspection commands : `branchrule classify|prefix|prefixes|match`.
//!
//! None of these read the rules file; they only use the git-flow defaults.

use anyhow::Result;
use branchrule::gitflow::{classify, get_reference_prefix, list_all_branch_prefix, short_reference};
use branchrule::pattern::is_ref_pattern_match;

pub fn cmd_classify(reference: &str, json: bool) -> Result<()> {
    let reference = short_reference(reference);
    let kind = classify(reference);
    let workspace = kind.default_workspace();

    if json {
        let value = serde_json::json!({
            "reference": reference,
            "kind": kind.to_string(),
            "prefix": kind.prefix(),
            "default_workspace": workspace,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}: {}", reference, kind);
    match workspace {
        Some(ws) => println!("  default workspace: {}", ws),
        None => println!("  default workspace: (none)"),
    }
    Ok(())
}

pub fn cmd_prefix(reference: &str) -> Result<()> {
    let prefix = get_reference_prefix(short_reference(reference))?;
    println!("{}", prefix);
    Ok(())
}

pub fn cmd_prefixes(json: bool) -> Result<()> {
    let table = list_all_branch_prefix();

    if json {
        let rows: Vec<_> = table
            .iter()
            .map(|p| {
                serde_json::json!({
                    "pattern": p.pattern,
                    "kind": p.kind.to_string(),
                    "workspace": p.workspace,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for entry in table {
        println!("{:<12} {}", entry.pattern, entry.workspace);
    }
    Ok(())
}

pub fn cmd_match(reference: &str, patterns: &[String]) -> Result<()> {
    let reference = short_reference(reference);
    if !is_ref_pattern_match(reference, patterns) {
        anyhow::bail!(
            "'{}' matches none of: {}",
            reference,
            patterns.join(", ")
        );
    }
    println!("'{}' matches", reference);
    Ok(())
}
