//! Calendar orchestration: configuration, variants, extraction runs and
//! feed rendering.
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ YAML config  │──▶│   Calendar    │──▶│ EventExtract │──▶│ IcsTemplate │──▶ <name>.ics
//! └──────────────┘   │ + variant     │   │ (core)       │   └─────────────┘
//!                    └───────┬───────┘   └──────────────┘
//!                            │ DocumentFetcher (sources)
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod generate;
pub mod template;
pub mod variant;

pub use calendar::{Calendar, OUTPUT_EXTENSION, SourceDocument};
pub use config::{CalendarConfig, DEFAULT_VARIANT, DateHeaderConfig, SourceUrls};
pub use error::{CalendarError, CalendarResult};
pub use generate::{GenerationReport, generate};
pub use template::{CalendarContext, ICS_TEMPLATE, IcsTemplate, TemplateEngine};
pub use variant::{CalendarVariant, DocumentPreparer};
