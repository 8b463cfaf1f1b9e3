//! Calendar orchestrator.
//!
//! ```text
//! CalendarConfig ─▶ fetch_documents ─▶ prepare_document ─▶ extract_events ─▶ render ─▶ <dir>/<name>.ics
//! ```
//!
//! A [`Calendar`] owns its documents and events. Nothing is shared between
//! calendars, so independent calendars can be generated concurrently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use schedcal_core::{
    AbbreviationTable, Event, EventExtractor, ZoneResolver, compile_selector, resolve_url,
};
use schedcal_sources::DocumentFetcher;
use scraper::Html;
use tracing::{debug, info, warn};

use crate::config::CalendarConfig;
use crate::error::{CalendarError, CalendarResult};
use crate::template::{CalendarContext, ICS_TEMPLATE, TemplateEngine};
use crate::variant::CalendarVariant;

/// Output file extension.
pub const OUTPUT_EXTENSION: &str = "ics";

/// A fetched source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub url: String,
    pub body: String,
}

/// One configured calendar and the state of its current run.
pub struct Calendar {
    config: CalendarConfig,
    raw: serde_yaml::Value,
    variant: CalendarVariant,
    resolver: Arc<dyn ZoneResolver>,
    documents: Vec<SourceDocument>,
    events: Vec<Event>,
}

impl std::fmt::Debug for Calendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calendar")
            .field("name", &self.config.name)
            .field("variant", &self.variant.name())
            .field("documents", &self.documents.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Calendar {
    /// Builds a calendar from a parsed configuration.
    pub fn load(config: CalendarConfig, raw: serde_yaml::Value) -> CalendarResult<Self> {
        config.validate()?;
        let variant = CalendarVariant::for_config(&config)?;
        for problem in config.field_problems() {
            warn!(calendar = %config.name, error = %problem, "Field will always be empty");
        }
        debug!(calendar = %config.name, variant = variant.name(), "Loaded calendar");
        Ok(Self {
            config,
            raw,
            variant,
            resolver: Arc::new(AbbreviationTable::default()),
            documents: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Parses YAML and builds a calendar.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> CalendarResult<Self> {
        let (config, raw) = CalendarConfig::from_yaml_str(yaml, origin)?;
        Self::load(config, raw)
    }

    /// Reads a YAML file and builds a calendar.
    pub fn load_from(path: &Path) -> CalendarResult<Self> {
        let (config, raw) = CalendarConfig::load_from(path)?;
        Self::load(config, raw)
    }

    /// Replaces the abbreviation resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn ZoneResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn variant(&self) -> &CalendarVariant {
        &self.variant
    }

    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    /// Every extracted event, valid or not, in extraction order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Fetches every source URL in order.
    ///
    /// Any failure discards the documents fetched so far; a calendar never
    /// renders from a partial set of sources.
    pub async fn fetch_documents(&mut self, fetcher: &dyn DocumentFetcher) -> CalendarResult<()> {
        self.documents.clear();
        let mut documents = Vec::with_capacity(self.config.urls().len());
        for url in self.config.urls() {
            debug!(calendar = %self.config.name, url = %url, fetcher = fetcher.name(), "Fetching");
            let body = fetcher
                .fetch(url)
                .await
                .map_err(|source| CalendarError::Fetch {
                    url: url.clone(),
                    source,
                })?;
            documents.push(SourceDocument {
                url: url.clone(),
                body,
            });
        }
        self.documents = documents;
        Ok(())
    }

    /// Stores documents directly, bypassing the fetcher.
    pub fn set_documents(&mut self, documents: Vec<SourceDocument>) {
        self.documents = documents;
    }

    /// Runs the variant's document hook on a snapshot.
    pub fn prepare_document(&self, document: &Html) -> Html {
        self.variant.prepare_document(document, &self.config)
    }

    /// Builds one event per fragment matching the events selector, across
    /// all documents in fetch order.
    pub fn extract_events(&mut self, now: DateTime<Utc>) -> CalendarResult<&[Event]> {
        let selector = compile_selector(&self.config.events.selector)
            .map_err(|message| CalendarError::invalid(&self.config.name, message))?;
        let extractor = EventExtractor::new(
            &self.config.events,
            self.variant.processors(),
            self.resolver.as_ref(),
            self.config.base_url.as_deref(),
            now,
        );

        let mut events = Vec::new();
        for document in &self.documents {
            let parsed = Html::parse_document(&document.body);
            let prepared = self.prepare_document(&parsed);
            let before = events.len();
            events.extend(prepared.select(&selector).map(|fragment| extractor.build(fragment)));
            debug!(
                calendar = %self.config.name,
                url = %document.url,
                fragments = events.len() - before,
                "Extracted events"
            );
        }

        self.events = events;
        Ok(&self.events)
    }

    /// Number of extracted events that may be rendered.
    pub fn valid_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_valid()).count()
    }

    /// Title plus the render map of every valid event.
    pub fn render_context(&self) -> CalendarContext {
        CalendarContext {
            title: self.config.title.clone(),
            events: self
                .events
                .iter()
                .filter(|event| event.is_valid())
                .map(|event| event.render(&self.config.name))
                .collect(),
        }
    }

    /// Renders the calendar feed.
    pub fn render(&self, template: &dyn TemplateEngine) -> CalendarResult<String> {
        template.render(ICS_TEMPLATE, &self.render_context())
    }

    /// Path of the feed inside `output_dir`.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", self.config.name, OUTPUT_EXTENSION))
    }

    /// Renders and writes `<output_dir>/<name>.ics`.
    pub fn generate_calendar(
        &self,
        output_dir: &Path,
        template: &dyn TemplateEngine,
    ) -> CalendarResult<PathBuf> {
        let rendered = self.render(template)?;
        let path = self.output_path(output_dir);
        std::fs::create_dir_all(output_dir).map_err(|source| CalendarError::Write {
            path: output_dir.to_path_buf(),
            source,
        })?;
        std::fs::write(&path, rendered).map_err(|source| CalendarError::Write {
            path: path.clone(),
            source,
        })?;
        info!(calendar = %self.config.name, path = %path.display(), "Wrote calendar");
        Ok(path)
    }

    /// Makes `url` absolute against the configured base URL.
    pub fn set_url_host(&self, url: &str) -> String {
        resolve_url(url, self.config.base_url.as_deref())
    }

    /// Reads a top-level configuration key, or the whole configuration when
    /// `key` is `None`. Keys outside the schema are included.
    pub fn cal_info(&self, key: Option<&str>) -> Option<&serde_yaml::Value> {
        match key {
            None => Some(&self.raw),
            Some(key) => self.raw.get(key),
        }
    }
}
