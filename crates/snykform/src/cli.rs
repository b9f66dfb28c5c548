//! Clap derive structures for the `snykform` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// snykform -- declarative Snyk organization and integration management
#[derive(Debug, Parser)]
#[command(
    name = "snykform",
    version,
    about = "Manage Snyk organizations and integrations declaratively",
    long_about = "Reconciles a manifest of Snyk organizations, their notification\n\
        settings, and their SCM/registry integrations against the Snyk v1 API.\n\n\
        Applied state, including write-only integration credentials, is kept\n\
        in a local state file.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "SNYK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Snyk group id (overrides profile)
    #[arg(long, short = 'g', env = "SNYK_API_GROUP", global = true)]
    pub group_id: Option<String>,

    /// Snyk API key
    #[arg(long, env = "SNYK_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "SNYK_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SNYK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "SNYK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a manifest without contacting the API
    Validate(ManifestArgs),

    /// Show what apply would change
    Plan(PlanArgs),

    /// Reconcile the remote side with the manifest
    Apply(PlanArgs),

    /// Re-read every applied resource and update the state file
    Refresh(StateArgs),

    /// Delete every resource recorded in the state file
    Destroy(StateArgs),

    /// List resources recorded in the state file
    Show(StateArgs),

    /// Inspect organizations in the group
    #[command(alias = "org")]
    Orgs(OrgsArgs),

    /// Inspect an organization's integrations
    #[command(alias = "int")]
    Integrations(IntegrationsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Manifest file (.yaml, .yml, .toml or .json)
    #[arg(long, short = 'f', default_value = "snykform.yaml")]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct StateArgs {
    /// State file (defaults to the configured state_file)
    #[arg(long, short = 's')]
    pub state: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    #[command(flatten)]
    pub state: StateArgs,

    /// Skip reading current remote state before planning
    #[arg(long)]
    pub no_refresh: bool,
}

// ── Orgs ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OrgsArgs {
    #[command(subcommand)]
    pub command: OrgsCommand,
}

#[derive(Debug, Subcommand)]
pub enum OrgsCommand {
    /// List organizations in the group
    #[command(alias = "ls")]
    List,

    /// Show one organization by id
    Get {
        /// Organization id
        id: String,
    },
}

// ── Integrations ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IntegrationsArgs {
    #[command(subcommand)]
    pub command: IntegrationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum IntegrationsCommand {
    /// List configured integration types and their ids
    #[command(alias = "ls")]
    List {
        /// Organization id
        #[arg(long)]
        org: String,
    },

    /// List the integration types snykform can manage
    Types,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: group_id, endpoint, api_key_env, ca_cert, timeout
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the API key in the system keyring
    SetKey {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
