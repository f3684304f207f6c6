use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cvp_checks::check::Context;
use cvp_checks::cli::{Cli, Commands, RunArgs};
use cvp_checks::config::Config;
use cvp_checks::drivetrain::HttpConnector;
use cvp_checks::output;
use cvp_checks::runner::run_checks;
use cvp_checks::salt::SaltApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => run(cli.run).await,
        Some(Commands::Run(args)) => run(args).await,
        Some(Commands::List) => {
            print!("{}", output::render_catalogue()?);
            Ok(())
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let salt = SaltApiClient::login(&config.salt).await?;
    let ctx = Context {
        salt: &salt,
        connector: &HttpConnector,
        config: &config,
    };

    let report = run_checks(&ctx, &args.selected(), !args.json).await;

    if let Err(e) = salt.logout().await {
        warn!("{:#}", e);
    }

    if args.json {
        println!("{}", output::render_json(&report)?);
    } else {
        print!("{}", output::render_text(&report)?);
    }

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
