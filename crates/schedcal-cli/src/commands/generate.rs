//! `schedcal generate`: one feed per calendar, all calendars concurrently.

use std::path::Path;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use schedcal_calendar::{Calendar, CalendarResult, GenerationReport, IcsTemplate, generate};
use schedcal_sources::DocumentFetcher;
use tracing::info;

use crate::config::LoadedCalendars;
use crate::error::{CliError, CliResult};

/// Generates every loaded calendar into `output_dir`.
///
/// Prints one line per calendar. Returns [`CliError::Failed`] when any
/// calendar, including one whose config did not load, failed.
pub async fn run(
    mut loaded: LoadedCalendars,
    names: &[String],
    output_dir: &Path,
    fetcher: &dyn DocumentFetcher,
    now: DateTime<Utc>,
) -> CliResult<Vec<GenerationReport>> {
    loaded.report_failures();
    loaded.select(names)?;
    let total = loaded.total();
    let load_failures = loaded.failures.len();

    info!(calendars = loaded.calendars.len(), output_dir = %output_dir.display(), "Generating");
    let template = IcsTemplate::new();
    let runs = loaded
        .calendars
        .into_iter()
        .map(|calendar| run_one(calendar, fetcher, &template, output_dir, now));
    let results = join_all(runs).await;

    let mut reports = Vec::new();
    let mut failed = load_failures;
    for (name, result) in results {
        match result {
            Ok(report) => {
                println!("{}", report.summary());
                reports.push(report);
            }
            Err(err) => {
                eprintln!("error: {}: {}", name, err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Failed { failed, total });
    }
    Ok(reports)
}

async fn run_one(
    mut calendar: Calendar,
    fetcher: &dyn DocumentFetcher,
    template: &IcsTemplate,
    output_dir: &Path,
    now: DateTime<Utc>,
) -> (String, CalendarResult<GenerationReport>) {
    let result = generate(&mut calendar, fetcher, template, output_dir, now).await;
    (calendar.name().to_string(), result)
}
