//! Core types: field table, zones, time parsing, markup cleanup, event extraction

pub mod event;
pub mod extract;
pub mod field;
pub mod links;
pub mod markup;
pub mod process;
pub mod time;
pub mod tracing;
pub mod zone;

pub use event::{Event, EventBuilder, EventContext, EventStatus};
pub use extract::{EventExtractor, FIELD_PIPELINE, FieldExtractionError, compile_selector};
pub use field::{FieldName, FieldSpec, FieldTable};
pub use links::{DescriptionLink, resolve_url};
pub use markup::{SplitDescription, clean_text, split_description};
pub use process::{FieldProcessor, ProcessorTable, join_values};
pub use time::{ParsedStart, format_instant, parse_duration, parse_end, parse_start};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use zone::{AbbreviationTable, DEFAULT_TZ, Zone, ZoneResolution, ZoneResolver, resolve_timezone};
