//! Calendar config discovery.
//!
//! `--config` takes files or directories. Directories contribute their
//! `*.yml` / `*.yaml` files sorted by file name; subdirectories are not
//! searched.

use std::path::{Path, PathBuf};

use schedcal_calendar::{Calendar, CalendarError};
use tracing::debug;

use crate::error::{CliError, CliResult};

const CONFIG_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Expands config arguments into a list of files.
pub fn discover(paths: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    if paths.is_empty() {
        return Err(CliError::NoConfig);
    }

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(scan_dir(path)?);
        } else {
            files.push(path.clone());
        }
    }
    debug!(count = files.len(), "Discovered config files");
    Ok(files)
}

fn scan_dir(dir: &Path) -> CliResult<Vec<PathBuf>> {
    let io_err = |source| CliError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_config = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext));
        if is_config && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Calendars that loaded, plus the files that did not.
#[derive(Debug, Default)]
pub struct LoadedCalendars {
    pub calendars: Vec<Calendar>,
    pub failures: Vec<(PathBuf, CalendarError)>,
}

impl LoadedCalendars {
    /// Loads every file. A broken file never stops the others.
    pub fn load(files: &[PathBuf]) -> Self {
        let mut loaded = Self::default();
        for file in files {
            match Calendar::load_from(file) {
                Ok(calendar) => loaded.calendars.push(calendar),
                Err(err) => loaded.failures.push((file.clone(), err)),
            }
        }
        loaded
    }

    /// Keeps only the named calendars. An empty list keeps everything.
    pub fn select(&mut self, names: &[String]) -> CliResult<()> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(missing) = names
            .iter()
            .find(|name| !self.calendars.iter().any(|c| c.name() == name.as_str()))
        {
            return Err(CliError::UnknownCalendar(missing.clone()));
        }
        self.calendars
            .retain(|calendar| names.iter().any(|name| name == calendar.name()));
        Ok(())
    }

    /// Prints one line per load failure to stderr.
    pub fn report_failures(&self) {
        for (path, err) in &self.failures {
            eprintln!("error: {}: {}", path.display(), err);
        }
    }

    pub fn total(&self) -> usize {
        self.calendars.len() + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, file: &str, name: &str) -> PathBuf {
        let path = dir.join(file);
        fs::write(
            &path,
            format!(
                "title: {name} games\nname: {name}\nurl: https://example.com/{name}\nevents:\n  selector: div.event\n"
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn no_paths() {
        assert!(matches!(discover(&[]), Err(CliError::NoConfig)));
    }

    #[test]
    fn directories_are_scanned_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "b.yaml", "bravo");
        write_config(dir.path(), "a.yml", "alpha");
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.yml")).unwrap();

        let files = discover(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.yml"), dir.path().join("b.yaml")]
        );
    }

    #[test]
    fn files_pass_through() {
        let files = discover(&[PathBuf::from("one.yml"), PathBuf::from("two.txt")]).unwrap();
        assert_eq!(files.len(), 2);
    }

    mod loading {
        use super::*;

        #[test]
        fn broken_file_does_not_stop_others() {
            let dir = tempfile::tempdir().unwrap();
            let good = write_config(dir.path(), "good.yml", "good");
            let bad = dir.path().join("bad.yml");
            fs::write(&bad, "title: [").unwrap();

            let loaded = LoadedCalendars::load(&[bad.clone(), good]);
            assert_eq!(loaded.calendars.len(), 1);
            assert_eq!(loaded.failures.len(), 1);
            assert_eq!(loaded.failures[0].0, bad);
            assert_eq!(loaded.total(), 2);
        }

        #[test]
        fn select_by_name() {
            let dir = tempfile::tempdir().unwrap();
            let files = vec![
                write_config(dir.path(), "a.yml", "alpha"),
                write_config(dir.path(), "b.yml", "bravo"),
            ];

            let mut loaded = LoadedCalendars::load(&files);
            loaded.select(&["bravo".to_string()]).unwrap();
            assert_eq!(loaded.calendars.len(), 1);
            assert_eq!(loaded.calendars[0].name(), "bravo");

            let mut loaded = LoadedCalendars::load(&files);
            assert!(matches!(
                loaded.select(&["charlie".to_string()]),
                Err(CliError::UnknownCalendar(ref n)) if n == "charlie"
            ));
        }
    }
}
