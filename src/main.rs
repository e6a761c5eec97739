use anyhow::{Context, Result};
use branchrule::service::Target;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "branchrule")]
#[command(version, about = "Git-flow branch classification and workspace rule resolution")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory containing .branchrule/rules.toml (defaults to current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a branch or tag into its git-flow kind
    Classify { reference: String },
    /// Print the canonical prefix of a reference; fails for unsupported references
    Prefix { reference: String },
    /// List the default git-flow branch-to-workspace table
    Prefixes,
    /// Check a reference against one or more patterns (exit code 1 when nothing matches)
    Match {
        reference: String,
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Resolve the effective workspace and policy flags for a reference
    Resolve {
        reference: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Check whether a workspace is configured by any rule
    CheckWorkspace {
        workspace: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List every configured branch pattern : workspace pair of an application
    Workspaces {
        #[arg(long)]
        app: u64,
    },
    /// Show the config namespace of an application for a workspace
    Namespace {
        #[arg(long)]
        app: u64,
        workspace: String,
    },
    /// View, validate or initialize the rules file
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(clap::Args, Clone, Copy)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Resolve against a project's rules
    #[arg(long)]
    pub project: Option<u64>,
    /// Resolve against an application's rules (inherits its project's rules)
    #[arg(long)]
    pub app: Option<u64>,
}

impl TargetArgs {
    fn target(&self) -> Target {
        match (self.app, self.project) {
            (Some(app), _) => Target::Application(app),
            (None, Some(project)) => Target::Project(project),
            // clap enforces exactly one of --project / --app
            (None, None) => unreachable!("target group is required"),
        }
    }
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current rules
    Show,
    /// Validate the rules file and show any warnings
    Validate,
    /// Initialize a starter rules.toml
    Init,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Classify { reference } => cmd::cmd_classify(reference, cli.json)?,
        Commands::Prefix { reference } => cmd::cmd_prefix(reference)?,
        Commands::Prefixes => cmd::cmd_prefixes(cli.json)?,
        Commands::Match {
            reference,
            patterns,
        } => cmd::cmd_match(reference, patterns)?,
        Commands::Resolve { reference, target } => {
            cmd::cmd_resolve(&project_dir, reference, target.target(), cli.json)?
        }
        Commands::CheckWorkspace { workspace, target } => {
            cmd::cmd_check_workspace(&project_dir, workspace, target.target(), cli.json)?
        }
        Commands::Workspaces { app } => cmd::cmd_workspaces(&project_dir, *app, cli.json)?,
        Commands::Namespace { app, workspace } => {
            cmd::cmd_namespace(&project_dir, *app, workspace)?
        }
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
