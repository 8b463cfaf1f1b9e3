//! Field spec table.
//!
//! A calendar declares, per event attribute, where that attribute lives inside
//! an event fragment. [`FieldTable`] holds one optional [`FieldSpec`] per
//! [`FieldName`]; the extraction order is fixed by [`FieldName::ORDERED`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator used when a field spec does not configure `join`.
pub const DEFAULT_JOIN: &str = " ";

/// The event attributes that can be extracted from a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    Title,
    Description,
    Timezone,
    #[serde(rename = "starttime")]
    StartTime,
    #[serde(rename = "endtime")]
    EndTime,
    Location,
    Url,
}

impl FieldName {
    /// Processing order. The timezone must be resolved before either time
    /// field is parsed.
    pub const ORDERED: [FieldName; 7] = [
        FieldName::Title,
        FieldName::Description,
        FieldName::Timezone,
        FieldName::StartTime,
        FieldName::EndTime,
        FieldName::Location,
        FieldName::Url,
    ];

    /// Returns the configuration key for this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Timezone => "timezone",
            Self::StartTime => "starttime",
            Self::EndTime => "endtime",
            Self::Location => "location",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ORDERED
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown field name: {}", s))
    }
}

/// Where to find one attribute inside an event fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// CSS selector evaluated against the fragment. Absent means the field
    /// always yields an empty raw value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// Attribute to read instead of the node's inner content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Separator for joining multiple matched nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,

    /// Offset from the start time, e.g. `"2 hours"`. Only meaningful on
    /// `endtime`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl FieldSpec {
    /// Creates a spec reading the inner content of `selector`.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::default()
        }
    }

    /// Builder method to read an attribute instead of inner content.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Builder method to set the join separator.
    pub fn with_join(mut self, join: impl Into<String>) -> Self {
        self.join = Some(join.into());
        self
    }

    /// Builder method to set a duration expression.
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Returns the join separator, defaulting to a single space.
    pub fn join_separator(&self) -> &str {
        self.join.as_deref().unwrap_or(DEFAULT_JOIN)
    }
}

/// The `events` block of a calendar configuration: the fragment selector
/// plus one optional spec per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTable {
    /// Selector enumerating event fragments in a document.
    pub selector: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starttime: Option<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endtime: Option<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<FieldSpec>,
}

impl FieldTable {
    /// Creates a table with the given fragment selector and no fields.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Self::default()
        }
    }

    /// Returns the spec configured for `field`, if any.
    pub fn field(&self, field: FieldName) -> Option<&FieldSpec> {
        match field {
            FieldName::Title => self.title.as_ref(),
            FieldName::Description => self.description.as_ref(),
            FieldName::Timezone => self.timezone.as_ref(),
            FieldName::StartTime => self.starttime.as_ref(),
            FieldName::EndTime => self.endtime.as_ref(),
            FieldName::Location => self.location.as_ref(),
            FieldName::Url => self.url.as_ref(),
        }
    }

    /// Builder method to set the spec for `field`.
    pub fn with_field(mut self, field: FieldName, spec: FieldSpec) -> Self {
        let slot = match field {
            FieldName::Title => &mut self.title,
            FieldName::Description => &mut self.description,
            FieldName::Timezone => &mut self.timezone,
            FieldName::StartTime => &mut self.starttime,
            FieldName::EndTime => &mut self.endtime,
            FieldName::Location => &mut self.location,
            FieldName::Url => &mut self.url,
        };
        *slot = Some(spec);
        self
    }

    /// Iterates configured fields in processing order.
    pub fn configured(&self) -> impl Iterator<Item = (FieldName, &FieldSpec)> {
        FieldName::ORDERED
            .into_iter()
            .filter_map(|name| self.field(name).map(|spec| (name, spec)))
    }
}
