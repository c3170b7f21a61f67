//! Clap derive structures for the `imperva` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Kept free of workspace-crate types so `build.rs` can include it.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Statistic category names accepted by `stats --stats`.
pub const STATS_CATEGORIES: [&str; 12] = [
    "visits_timeseries",
    "hits_timeseries",
    "bandwidth_timeseries",
    "requests_geo_dist_summary",
    "visits_dist_summary",
    "caching",
    "caching_timeseries",
    "threats",
    "incap_rules",
    "incap_rules_timeseries",
    "delivery_rules",
    "delivery_rules_timeseries",
];

// ── Top-Level CLI ────────────────────────────────────────────────────

/// imperva -- manage Imperva Cloud WAF sites, rules and traffic data
#[derive(Debug, Parser)]
#[command(
    name = "imperva",
    version,
    about = "Manage Imperva Cloud WAF sites, rules and traffic from the command line",
    long_about = "A CLI for the Imperva Cloud WAF REST API.\n\n\
        Lists and inspects protected sites, manages custom rules, releases\n\
        blocked sessions, and pulls visit logs and aggregated statistics.",
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
    /// Config file (TOML, or JSON when the name ends in .json)
    #[arg(long, short = 'C', env = "IMPERVA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// API host (default https://my.imperva.com)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// API identifier
    #[arg(long, global = true)]
    pub api_id: Option<String>,

    /// API key
    #[arg(long, env = "IMPERVA_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Account to scope site listing to
    #[arg(long, global = true)]
    pub account_id: Option<String>,

    /// API generation used for rule listing
    #[arg(long, global = true)]
    pub api_generation: Option<ApiGenerationArg>,

    /// Site ID (prompted for interactively when omitted)
    #[arg(long, short = 's', env = "IMPERVA_SITE", global = true)]
    pub site: Option<i64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "IMPERVA_OUTPUT",
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

    /// Request timeout in seconds (overrides timeout_secs)
    #[arg(long, global = true)]
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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ApiGenerationArg {
    /// Grouped `incap_rules` listing
    V1,
    /// Flat `data` listing
    V3,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and inspect protected sites
    Sites(SitesArgs),

    /// Manage custom rules
    Rules(RulesArgs),

    /// Release blocked sessions
    Sessions(SessionsArgs),

    /// Fetch traffic log entries
    Visits(VisitsArgs),

    /// Fetch aggregated statistics
    Stats(StatsArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites visible to the API key
    #[command(alias = "ls")]
    List(PageArgs),

    /// Show a site's record, optionally running status tests
    Status {
        /// Tests to run first (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tests: Vec<StatusTestArg>,
    },
}

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Results per page
    #[arg(long, default_value = "100")]
    pub page_size: u32,

    /// Page number (zero-based)
    #[arg(long, default_value = "0")]
    pub page_num: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusTestArg {
    #[value(name = "domain_validation")]
    DomainValidation,
    Services,
    Dns,
}

// ── Rules ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List a site's custom rules
    #[command(alias = "ls")]
    List,

    /// Show one rule
    Get {
        /// Rule ID
        rule_id: String,
    },

    /// Create a rule from flags or a JSON file
    Create(RuleSpecArgs),

    /// Replace a rule from flags or a JSON file
    Update {
        /// Rule ID
        rule_id: String,

        #[command(flatten)]
        spec: RuleSpecArgs,
    },

    /// Delete a rule
    #[command(alias = "rm")]
    Delete {
        /// Rule ID
        rule_id: String,
    },
}

#[derive(Debug, Args)]
pub struct RuleSpecArgs {
    /// Read the rule body from a JSON file (flags override its fields)
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,

    /// Rule name
    #[arg(long)]
    pub name: Option<String>,

    /// Action taken when the filter matches
    #[arg(long)]
    pub action: Option<RuleActionArg>,

    /// Match expression, e.g. 'ClientIP == 1.2.3.4'
    #[arg(long)]
    pub filter: Option<String>,

    /// Response code override
    #[arg(long)]
    pub response_code: Option<u16>,

    /// Fixed block duration in minutes (block actions only)
    #[arg(long)]
    pub block_minutes: Option<u32>,

    /// Create the rule disabled
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RuleActionArg {
    Redirect,
    SimplifiedRedirect,
    BlockIp,
    BlockUser,
    BlockSession,
    ChallengeCookie,
    ChallengeJs,
    ChallengeCaptcha,
    Allow,
    RewriteUrl,
}

// ── Sessions ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// Release (unblock) a session
    Release {
        /// Session ID
        session_id: String,
    },
}

// ── Visits & Stats ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TimeRangeArgs {
    /// Preset range (last_hour, today, last_7_days, last_30_days, ...)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub time_range: Option<String>,

    /// Custom range start, epoch seconds
    #[arg(long, requires = "end")]
    pub start: Option<i64>,

    /// Custom range end, epoch seconds
    #[arg(long, requires = "start")]
    pub end: Option<i64>,
}

#[derive(Debug, Args)]
pub struct VisitsArgs {
    #[command(flatten)]
    pub range: TimeRangeArgs,

    /// Results per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Page number (zero-based)
    #[arg(long)]
    pub page_num: Option<u32>,

    /// Only visits with security events of this kind
    #[arg(long)]
    pub security: Option<SecurityArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SecurityArg {
    All,
    Blocked,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub range: TimeRangeArgs,

    /// Categories to fetch (comma-separated; default: all)
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = PossibleValuesParser::new(STATS_CATEGORIES)
    )]
    pub stats: Vec<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration (API key masked)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
