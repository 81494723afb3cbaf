use anyhow::Result;
use clap::Parser;
use repodigest::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG controls verbosity; warnings (e.g. the file-cap notice)
    // are visible by default.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Index(args) => repodigest::index_run(args, &ctx),
        Commands::Digest(args) => repodigest::digest_run(args, &ctx),
        Commands::Init(args) => repodigest::infra::config::init(args, &ctx),
        Commands::Completions(args) => repodigest::completion::run(args),
    }
}
