//! One complete calendar run: fetch, extract, render, write.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use schedcal_sources::DocumentFetcher;
use serde::Serialize;
use tracing::{Instrument, info, info_span};

use crate::calendar::Calendar;
use crate::error::CalendarResult;
use crate::template::TemplateEngine;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub name: String,
    pub path: PathBuf,
    /// Fragments matched by the events selector across all documents.
    pub matched: usize,
    /// Events written to the feed.
    pub rendered: usize,
    /// Events dropped because they had no start time.
    pub skipped: usize,
}

impl GenerationReport {
    /// One-line summary for terminal output.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} event(s) written to {} ({} skipped)",
            self.name,
            self.rendered,
            self.path.display(),
            self.skipped
        )
    }
}

/// Runs `calendar` end to end.
///
/// Stops at the first failure; nothing is written unless every source was
/// fetched.
pub async fn generate(
    calendar: &mut Calendar,
    fetcher: &dyn DocumentFetcher,
    template: &dyn TemplateEngine,
    output_dir: &Path,
    now: DateTime<Utc>,
) -> CalendarResult<GenerationReport> {
    let span = info_span!("generate", calendar = %calendar.name());
    async move {
        calendar.fetch_documents(fetcher).await?;
        let matched = calendar.extract_events(now)?.len();
        let rendered = calendar.valid_count();
        let path = calendar.generate_calendar(output_dir, template)?;

        let report = GenerationReport {
            name: calendar.name().to_string(),
            path,
            matched,
            rendered,
            skipped: matched - rendered,
        };
        info!(matched, rendered, skipped = report.skipped, "Calendar generated");
        Ok(report)
    }
    .instrument(span)
    .await
}
