//! CLI entry point - the composition root.
//!
//! Loads configuration, bootstraps the context and dispatches to handlers.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use autoget_cli::handlers::track::TrackArgs;
use autoget_cli::{AppConfig, Cli, CliError, Commands, bootstrap, handlers};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(&cli.config)?;
    let ctx = bootstrap(config).await?;

    match cli.command {
        Commands::Run => handlers::run::execute(&ctx).await?,
        Commands::Sync { downloader } => {
            handlers::sync::execute(&ctx, downloader.as_deref()).await?;
        }
        Commands::Seeding { downloader } => {
            handlers::seeding::execute(&ctx, downloader.as_deref()).await?;
        }
        Commands::Track {
            downloader,
            hash,
            title,
            title2,
            indexer,
            category,
            files,
        } => {
            let args = TrackArgs {
                downloader,
                hash,
                title,
                title2,
                indexer,
                category,
                files,
            };
            handlers::track::execute(&ctx, args).await?;
        }
        Commands::List { downloader } => {
            handlers::list::execute(&ctx, downloader.as_deref()).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads AUTOGET_CONFIG
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
