//! `schedcal list`.

use crate::config::LoadedCalendars;

/// One tab-separated `name  title  url-count` line per calendar.
pub fn run(loaded: &LoadedCalendars) -> Vec<String> {
    loaded
        .calendars
        .iter()
        .map(|calendar| {
            format!(
                "{}\t{}\t{}",
                calendar.name(),
                calendar.title(),
                calendar.config().urls().len()
            )
        })
        .collect()
}
