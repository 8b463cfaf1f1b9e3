//! Per-field processing hooks.
//!
//! Between raw extraction and the typed setters, every field passes through a
//! processor chosen by the calendar variant. The default joins the matched
//! values with the field's separator; variants replace individual entries to
//! handle site-specific quirks.

use std::collections::BTreeMap;

use crate::field::{FieldName, FieldSpec};

/// Turns the raw values matched for one field into the setter input.
pub type FieldProcessor = fn(&[String], &FieldSpec) -> String;

/// Joins raw values with the spec's separator.
pub fn join_values(values: &[String], spec: &FieldSpec) -> String {
    values.join(spec.join_separator())
}

/// Field → processor strategy table. Fields without an entry use
/// [`join_values`].
#[derive(Debug, Clone, Default)]
pub struct ProcessorTable {
    overrides: BTreeMap<FieldName, FieldProcessor>,
}

impl ProcessorTable {
    /// Creates a table where every field uses [`join_values`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to override the processor for `field`.
    pub fn with(mut self, field: FieldName, processor: FieldProcessor) -> Self {
        self.overrides.insert(field, processor);
        self
    }

    /// Returns the processor for `field`.
    pub fn get(&self, field: FieldName) -> FieldProcessor {
        self.overrides.get(&field).copied().unwrap_or(join_values)
    }

    /// Returns true if `field` has a non-default processor.
    pub fn is_overridden(&self, field: FieldName) -> bool {
        self.overrides.contains_key(&field)
    }

    /// Runs the processor for `field`.
    pub fn process(&self, field: FieldName, values: &[String], spec: &FieldSpec) -> String {
        (self.get(field))(values, spec)
    }
}
