//! Fragment → [`Event`] extraction.
//!
//! [`EventExtractor`] compiles the field selectors of a calendar once and then
//! builds one event per fragment:
//!
//! ```text
//! fragment ──select/attr──▶ raw values ──processor──▶ string ──setter──▶ EventBuilder
//! ```
//!
//! Fields run in [`FIELD_PIPELINE`] order. A field whose selector is missing
//! yields no raw values; a field whose extraction fails is logged and also
//! yields no raw values. Neither aborts the event.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Selector};
use thiserror::Error;
use tracing::{debug, warn};

use crate::event::{Event, EventBuilder};
use crate::field::{FieldName, FieldSpec, FieldTable};
use crate::process::ProcessorTable;
use crate::zone::ZoneResolver;

/// Errors raised while extracting a single field. Always recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldExtractionError {
    /// The configured selector does not parse.
    #[error("invalid selector {selector:?} for field {field}: {message}")]
    InvalidSelector {
        field: FieldName,
        selector: String,
        message: String,
    },

    /// Nodes matched but none carries the configured attribute.
    #[error("attribute {attribute:?} missing on all {matched} node(s) matched for field {field}")]
    MissingAttribute {
        field: FieldName,
        attribute: String,
        matched: usize,
    },
}

/// Applies one processed value to the builder.
pub type FieldSetter = fn(&mut EventBuilder<'_>, &str, &FieldSpec);

/// Ordered (field, setter) table. Covers every [`FieldName`] exactly once,
/// in [`FieldName::ORDERED`] order.
pub const FIELD_PIPELINE: [(FieldName, FieldSetter); 7] = [
    (FieldName::Title, apply_title),
    (FieldName::Description, apply_description),
    (FieldName::Timezone, apply_timezone),
    (FieldName::StartTime, apply_start_time),
    (FieldName::EndTime, apply_end_time),
    (FieldName::Location, apply_location),
    (FieldName::Url, apply_url),
];

fn apply_title(b: &mut EventBuilder<'_>, value: &str, _: &FieldSpec) {
    b.set_title(value);
}

fn apply_description(b: &mut EventBuilder<'_>, value: &str, _: &FieldSpec) {
    b.set_description(value);
}

fn apply_timezone(b: &mut EventBuilder<'_>, value: &str, _: &FieldSpec) {
    b.set_timezone(value);
}

fn apply_start_time(b: &mut EventBuilder<'_>, value: &str, _: &FieldSpec) {
    b.set_start_time(value);
}

fn apply_end_time(b: &mut EventBuilder<'_>, value: &str, spec: &FieldSpec) {
    b.set_end_time(value, spec.duration.as_deref());
}

fn apply_location(b: &mut EventBuilder<'_>, value: &str, _: &FieldSpec) {
    b.set_location(value);
}

fn apply_url(b: &mut EventBuilder<'_>, value: &str, _: &FieldSpec) {
    b.set_url(value);
}

/// Parses a CSS selector, mapping the error to an owned message.
pub fn compile_selector(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("{:?}", e))
}

struct CompiledField {
    name: FieldName,
    spec: FieldSpec,
    selector: Option<Result<Selector, FieldExtractionError>>,
}

impl CompiledField {
    fn compile(name: FieldName, spec: Option<&FieldSpec>) -> Self {
        let spec = spec.cloned().unwrap_or_default();
        let selector = spec.selector.as_deref().map(|raw| {
            compile_selector(raw).map_err(|message| {
                let err = FieldExtractionError::InvalidSelector {
                    field: name,
                    selector: raw.to_string(),
                    message,
                };
                warn!(field = %name, error = %err, "Field selector does not compile");
                err
            })
        });
        Self {
            name,
            spec,
            selector,
        }
    }

    fn extract(&self, fragment: ElementRef<'_>) -> Result<Vec<String>, FieldExtractionError> {
        let selector = match &self.selector {
            None => return Ok(Vec::new()),
            Some(Err(e)) => return Err(e.clone()),
            Some(Ok(selector)) => selector,
        };

        let nodes: Vec<ElementRef<'_>> = fragment.select(selector).collect();
        let Some(attribute) = self.spec.attribute.as_deref() else {
            return Ok(nodes.iter().map(|node| node.inner_html()).collect());
        };

        let values: Vec<String> = nodes
            .iter()
            .filter_map(|node| node.value().attr(attribute))
            .map(str::to_string)
            .collect();

        if values.is_empty() && !nodes.is_empty() {
            return Err(FieldExtractionError::MissingAttribute {
                field: self.name,
                attribute: attribute.to_string(),
                matched: nodes.len(),
            });
        }
        Ok(values)
    }
}

/// Builds events from fragments for one calendar.
pub struct EventExtractor<'a> {
    fields: Vec<CompiledField>,
    processors: &'a ProcessorTable,
    resolver: &'a dyn ZoneResolver,
    base_url: Option<&'a str>,
    now: DateTime<Utc>,
}

impl<'a> EventExtractor<'a> {
    /// Compiles the field selectors of `table`.
    ///
    /// `now` is used for year-less dates and the end-time fallback, so one
    /// extraction run sees a single consistent clock.
    pub fn new(
        table: &FieldTable,
        processors: &'a ProcessorTable,
        resolver: &'a dyn ZoneResolver,
        base_url: Option<&'a str>,
        now: DateTime<Utc>,
    ) -> Self {
        let fields = FIELD_PIPELINE
            .iter()
            .map(|(name, _)| CompiledField::compile(*name, table.field(*name)))
            .collect();
        Self {
            fields,
            processors,
            resolver,
            base_url,
            now,
        }
    }

    /// Builds one event from `fragment`. Never fails.
    pub fn build(&self, fragment: ElementRef<'_>) -> Event {
        let mut builder = EventBuilder::new(self.resolver, self.base_url, self.now);

        for ((name, setter), field) in FIELD_PIPELINE.iter().zip(&self.fields) {
            let raw = field.extract(fragment).unwrap_or_else(|err| {
                debug!(field = %name, error = %err, "Field extraction failed, using empty value");
                Vec::new()
            });
            let value = self.processors.process(*name, &raw, &field.spec);
            setter(&mut builder, &value, &field.spec);
        }

        builder.build()
    }
}
