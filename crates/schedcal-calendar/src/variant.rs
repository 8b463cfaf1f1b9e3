//! Calendar variants: per-site processing hooks.
//!
//! A variant bundles a [`ProcessorTable`] (field → processing fn) with a
//! document preparation fn. The config names its variant; unknown names are
//! rejected at load time.
//!
//! | name | processors | document |
//! |---|---|---|
//! | `default` | join | unchanged |
//! | `trailing-timezone` | zone from last token of the time text | unchanged |
//! | `sponsored-titles` | sponsor suffix cut from titles | unchanged |
//! | `date-headers` | join | header dates copied into rows |

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use schedcal_core::{
    FieldName, FieldProcessor, FieldSpec, ProcessorTable, clean_text, compile_selector,
    join_values,
};
use scraper::{Html, Node};
use tracing::{debug, warn};

use crate::config::CalendarConfig;
use crate::error::{CalendarError, CalendarResult};

/// Zone tokens that may trail a time string.
static ZONE_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(?:[ECMP][SD]?T|AK[SD]?T|HST|UTC|GMT|TBD)$").expect("Invalid zone token regex")
});

static SPONSOR_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\b(?:presented|sponsored|powered)\s+by\b.*$")
        .expect("Invalid sponsor suffix regex")
});

/// Builds a new document snapshot from the fetched one.
pub type DocumentPreparer = fn(&Html, &CalendarConfig) -> Html;

/// A named bundle of processing hooks.
#[derive(Clone)]
pub struct CalendarVariant {
    name: &'static str,
    processors: ProcessorTable,
    prepare: DocumentPreparer,
    requires_date_header: bool,
}

impl fmt::Debug for CalendarVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarVariant")
            .field("name", &self.name)
            .field("processors", &self.processors)
            .finish_non_exhaustive()
    }
}

impl CalendarVariant {
    /// Names of the built-in variants.
    pub const NAMES: [&'static str; 4] = [
        "default",
        "trailing-timezone",
        "sponsored-titles",
        "date-headers",
    ];

    /// Looks up a built-in variant.
    pub fn by_name(name: &str) -> Option<Self> {
        let variant = match name {
            "default" => Self::new("default"),
            "trailing-timezone" => Self::new("trailing-timezone")
                .with_processor(FieldName::Timezone, trailing_zone)
                .with_processor(FieldName::StartTime, strip_trailing_zone)
                .with_processor(FieldName::EndTime, strip_trailing_zone),
            "sponsored-titles" => {
                Self::new("sponsored-titles").with_processor(FieldName::Title, strip_sponsor)
            }
            "date-headers" => {
                let mut variant = Self::new("date-headers").with_preparer(propagate_date_headers);
                variant.requires_date_header = true;
                variant
            }
            _ => return None,
        };
        Some(variant)
    }

    /// Resolves the variant named in `config` and checks its requirements.
    pub fn for_config(config: &CalendarConfig) -> CalendarResult<Self> {
        let variant =
            Self::by_name(&config.variant).ok_or_else(|| CalendarError::UnknownVariant {
                name: config.name.clone(),
                variant: config.variant.clone(),
            })?;
        if variant.requires_date_header && config.date_header.is_none() {
            return Err(CalendarError::invalid(
                &config.name,
                format!("variant '{}' requires a date_header block", variant.name),
            ));
        }
        Ok(variant)
    }

    fn new(name: &'static str) -> Self {
        Self {
            name,
            processors: ProcessorTable::new(),
            prepare: unchanged,
            requires_date_header: false,
        }
    }

    fn with_processor(mut self, field: FieldName, processor: FieldProcessor) -> Self {
        self.processors = self.processors.with(field, processor);
        self
    }

    fn with_preparer(mut self, prepare: DocumentPreparer) -> Self {
        self.prepare = prepare;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn processors(&self) -> &ProcessorTable {
        &self.processors
    }

    /// Runs the document preparation hook.
    pub fn prepare_document(&self, document: &Html, config: &CalendarConfig) -> Html {
        (self.prepare)(document, config)
    }
}

fn unchanged(document: &Html, _: &CalendarConfig) -> Html {
    document.clone()
}

/// `"7:00 PM ET"` → `"ET"`.
fn trailing_zone(values: &[String], spec: &FieldSpec) -> String {
    let text = clean_text(&join_values(values, spec));
    text.rsplit_once(' ')
        .map(|(_, last)| last.to_string())
        .unwrap_or(text)
}

/// `"7:00 PM ET"` → `"7:00 PM"`. Text without a trailing zone is unchanged.
fn strip_trailing_zone(values: &[String], spec: &FieldSpec) -> String {
    let text = clean_text(&join_values(values, spec));
    match text.rsplit_once(' ') {
        Some((head, last)) if ZONE_TOKEN_REGEX.is_match(last) => head.to_string(),
        _ => text,
    }
}

/// `"Opener - presented by Acme"` → `"Opener"`.
fn strip_sponsor(values: &[String], spec: &FieldSpec) -> String {
    let text = clean_text(&join_values(values, spec));
    let cut = SPONSOR_SUFFIX_REGEX.replace(&text, "");
    cut.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '|' | ':' | '–' | '—'))
        .to_string()
}

/// Prefixes every event row's time element with the text of the closest
/// preceding header. Rows before the first header are left alone.
fn propagate_date_headers(document: &Html, config: &CalendarConfig) -> Html {
    let Some(header) = &config.date_header else {
        return document.clone();
    };
    let combined = format!("{}, {}", header.selector, config.events.selector);
    let (Ok(combined), Ok(header_selector), Ok(target_selector)) = (
        compile_selector(&combined),
        compile_selector(&header.selector),
        compile_selector(&header.target),
    ) else {
        warn!(calendar = %config.name, "date_header selectors do not compile, document unchanged");
        return document.clone();
    };

    let mut current: Option<String> = None;
    let mut inserts = Vec::new();
    for element in document.select(&combined) {
        if header_selector.matches(&element) {
            current = Some(clean_text(&element.inner_html())).filter(|t| !t.is_empty());
            continue;
        }
        if let Some(date) = &current {
            inserts.extend(
                element
                    .select(&target_selector)
                    .map(|target| (target.id(), format!("{} ", date))),
            );
        }
    }

    debug!(calendar = %config.name, rows = inserts.len(), "Propagating date headers");
    let mut prepared = document.clone();
    for (id, prefix) in inserts {
        if let Some(text) = text_node(&prefix)
            && let Some(mut target) = prepared.tree.get_mut(id)
        {
            target.prepend(text);
        }
    }
    prepared
}

/// Builds a detached text node holding `text`.
fn text_node(text: &str) -> Option<Node> {
    Html::parse_fragment(text)
        .tree
        .nodes()
        .find(|node| node.value().is_text())
        .map(|node| node.value().clone())
}
