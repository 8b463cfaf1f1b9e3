//! `schedcal render`: print one calendar to stdout.

use chrono::{DateTime, Utc};
use schedcal_calendar::IcsTemplate;
use schedcal_sources::DocumentFetcher;

use crate::config::LoadedCalendars;
use crate::error::{CliError, CliResult};

/// Fetches and extracts `name`, then returns the ICS text or, with `json`,
/// the pretty-printed render context.
pub async fn run(
    mut loaded: LoadedCalendars,
    name: &str,
    json: bool,
    fetcher: &dyn DocumentFetcher,
    now: DateTime<Utc>,
) -> CliResult<String> {
    loaded.select(&[name.to_string()])?;
    let mut calendar = loaded
        .calendars
        .pop()
        .ok_or_else(|| CliError::UnknownCalendar(name.to_string()))?;

    calendar.fetch_documents(fetcher).await?;
    calendar.extract_events(now)?;

    if json {
        Ok(serde_json::to_string_pretty(&calendar.render_context())?)
    } else {
        Ok(calendar.render(&IcsTemplate::new())?)
    }
}
