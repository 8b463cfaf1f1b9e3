//! Per-calendar configuration.
//!
//! One YAML file describes one calendar:
//!
//! ```yaml
//! title: Rangers Home Games
//! name: rangers
//! url: https://example.com/schedule
//! base_url: https://example.com
//! variant: trailing-timezone
//! events:
//!   selector: div.event
//!   title: { selector: h2 }
//!   starttime: { selector: time, attribute: datetime }
//!   endtime: { duration: 2 hours }
//! ```
//!
//! `url` accepts a single string or a list. Keys the schema does not know
//! are kept and remain reachable through [`Calendar::cal_info`](crate::Calendar::cal_info).

use std::path::Path;

use schedcal_core::{FieldExtractionError, FieldTable, compile_selector};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Variant used when the config does not name one.
pub const DEFAULT_VARIANT: &str = "default";

/// One source URL or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceUrls {
    One(String),
    Many(Vec<String>),
}

impl SourceUrls {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(url) => std::slice::from_ref(url),
            Self::Many(urls) => urls,
        }
    }
}

/// Header rows whose text is carried into the following event rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateHeaderConfig {
    /// Selector for header elements, evaluated on the whole document.
    pub selector: String,
    /// Selector for the time element inside each event row.
    pub target: String,
}

/// A loaded calendar configuration. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar display title.
    pub title: String,
    /// Short name, used for the output file name and event UIDs.
    pub name: String,
    pub url: SourceUrls,
    /// Prefix for relative links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_header: Option<DateHeaderConfig>,
    pub events: FieldTable,
}

fn default_variant() -> String {
    DEFAULT_VARIANT.to_string()
}

impl CalendarConfig {
    /// Parses a YAML document. `origin` names the source in errors.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> CalendarResult<(Self, serde_yaml::Value)> {
        let raw: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|source| CalendarError::ConfigParse {
                origin: origin.to_string(),
                source,
            })?;
        let config: Self =
            serde_yaml::from_value(raw.clone()).map_err(|source| CalendarError::ConfigParse {
                origin: origin.to_string(),
                source,
            })?;
        config.validate()?;
        Ok((config, raw))
    }

    /// Reads and parses a YAML file.
    pub fn load_from(path: &Path) -> CalendarResult<(Self, serde_yaml::Value)> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CalendarError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml, &path.display().to_string())
    }

    /// Source URLs in configured order.
    pub fn urls(&self) -> &[String] {
        self.url.as_slice()
    }

    /// Checks the problems that make the calendar unusable.
    ///
    /// Field selectors are not checked here; a bad field selector only
    /// empties that field (see [`CalendarConfig::field_problems`]).
    pub fn validate(&self) -> CalendarResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CalendarError::invalid(&self.title, "name is empty"));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(CalendarError::invalid(
                &self.name,
                "name must be usable as a file name",
            ));
        }
        if self.urls().is_empty() || self.urls().iter().any(|u| u.trim().is_empty()) {
            return Err(CalendarError::invalid(&self.name, "no source url"));
        }
        if let Err(message) = compile_selector(&self.events.selector) {
            return Err(CalendarError::invalid(
                &self.name,
                format!("events selector {:?} is invalid: {}", self.events.selector, message),
            ));
        }
        if let Some(header) = &self.date_header {
            for selector in [&header.selector, &header.target] {
                if let Err(message) = compile_selector(selector) {
                    return Err(CalendarError::invalid(
                        &self.name,
                        format!("date_header selector {:?} is invalid: {}", selector, message),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Field selectors that do not compile. These fields will always be
    /// empty.
    pub fn field_problems(&self) -> Vec<FieldExtractionError> {
        self.events
            .configured()
            .filter_map(|(field, spec)| {
                let selector = spec.selector.as_deref()?;
                compile_selector(selector)
                    .err()
                    .map(|message| FieldExtractionError::InvalidSelector {
                        field,
                        selector: selector.to_string(),
                        message,
                    })
            })
            .collect()
    }
}
