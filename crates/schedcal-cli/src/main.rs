//! schedcal CLI entry point.

use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;

use schedcal_cli::cli::{Cli, Command};
use schedcal_cli::commands;
use schedcal_cli::config::{LoadedCalendars, discover};
use schedcal_cli::error::CliResult;
use schedcal_core::tracing::{TracingConfig, init_tracing};
use schedcal_sources::{FetchConfig, WebFetcher};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config.with_format(cli.log_format)) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let files = discover(&cli.config)?;
    let loaded = LoadedCalendars::load(&files);
    let now = Utc::now();

    match cli.command {
        Command::Generate {
            output_dir,
            calendars,
        } => {
            let fetcher = web_fetcher(cli.timeout)?;
            commands::generate::run(loaded, &calendars, &output_dir, &fetcher, now).await?;
            Ok(())
        }
        Command::Render { calendar, json } => {
            loaded.report_failures();
            let fetcher = web_fetcher(cli.timeout)?;
            let output = commands::render::run(loaded, &calendar, json, &fetcher, now).await?;
            println!("{}", output);
            Ok(())
        }
        Command::Validate => commands::validate::run(&loaded),
        Command::List => {
            loaded.report_failures();
            for line in commands::list::run(&loaded) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

fn web_fetcher(timeout_secs: u64) -> CliResult<WebFetcher> {
    let config = FetchConfig::default().with_timeout(Duration::from_secs(timeout_secs));
    Ok(WebFetcher::new(config)?)
}
