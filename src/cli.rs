use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "repodigest")]
#[command(
    about = "A fast CLI that indexes a repository and renders a bounded context digest for LLM workflows"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress output and non-essential messages
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index a repository and emit the JSON artifact
    Index(IndexArgs),

    /// Index a repository and render the bounded text digest
    Digest(DigestArgs),

    /// Initialize a repodigest.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Parser)]
pub struct IndexArgs {
    /// Root directory to index
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Additional glob patterns to ignore
    #[arg(short, long)]
    pub ignore: Vec<String>,

    /// Maximum number of files to process
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Exclude test files from the index
    #[arg(long)]
    pub no_tests: bool,

    /// Extra detector identifiers to enable
    #[arg(long)]
    pub detector: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct DigestArgs {
    /// Root directory to index
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Additional glob patterns to ignore
    #[arg(short, long)]
    pub ignore: Vec<String>,

    /// Maximum number of files to process
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Exclude test files from the index
    #[arg(long)]
    pub no_tests: bool,

    /// Skip inlining README/rules file contents
    #[arg(long)]
    pub no_special_files: bool,
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Directory for the config file
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to stdout
    #[arg(long, default_value = "true")]
    #[arg(action = clap::ArgAction::Set)]
    pub stdout: bool,

    /// Directory to write the completion file into
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
