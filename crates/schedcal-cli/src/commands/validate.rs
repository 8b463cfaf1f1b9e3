//! `schedcal validate`: load every config and report problems.

use crate::config::LoadedCalendars;
use crate::error::{CliError, CliResult};

/// One line per calendar, per field warning and per config that did not
/// load.
pub fn report(loaded: &LoadedCalendars) -> Vec<String> {
    let mut lines = Vec::new();
    for calendar in &loaded.calendars {
        lines.push(format!(
            "ok: {} (variant {}, {} source(s))",
            calendar.name(),
            calendar.variant().name(),
            calendar.config().urls().len()
        ));
        for problem in calendar.config().field_problems() {
            lines.push(format!("warning: {}: {}", calendar.name(), problem));
        }
    }
    for (path, err) in &loaded.failures {
        lines.push(format!("error: {}: {}", path.display(), err));
    }
    lines
}

/// Prints the report. Fails when any config did not load.
pub fn run(loaded: &LoadedCalendars) -> CliResult<()> {
    for line in report(loaded) {
        println!("{}", line);
    }
    if loaded.failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::Failed {
            failed: loaded.failures.len(),
            total: loaded.total(),
        })
    }
}
