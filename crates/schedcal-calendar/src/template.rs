//! Template collaborator.
//!
//! The orchestrator hands a [`CalendarContext`] to a [`TemplateEngine`] by
//! template name. [`IcsTemplate`] is the built-in engine; it serves the
//! `calendar.ics` template and builds the feed with `icalendar`.

use icalendar::{Calendar as IcsCalendar, Component, Event as IcsEvent, EventLike, Property};
use schedcal_core::EventContext;
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Name of the calendar feed template.
pub const ICS_TEMPLATE: &str = "calendar.ics";

/// Render context for one calendar: the title plus every valid event in
/// extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarContext {
    pub title: String,
    pub events: Vec<EventContext>,
}

/// Renders a named template against a calendar context.
pub trait TemplateEngine: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CalendarError::Render`] for unknown templates or contexts
    /// the template cannot express.
    fn render(&self, template_name: &str, context: &CalendarContext) -> CalendarResult<String>;
}

/// Built-in engine producing an iCalendar document.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcsTemplate;

impl IcsTemplate {
    pub fn new() -> Self {
        Self
    }

    fn event(context: &EventContext) -> CalendarResult<IcsEvent> {
        let mut event = IcsEvent::new();
        event
            .uid(&context.uid)
            .summary(&context.title)
            .description(&context.description)
            .location(&context.location);
        if !context.url.is_empty() {
            event.add_property("URL", &context.url);
        }
        event.append_property(time_property("DTSTART", &context.start_time)?);
        event.append_property(time_property("DTEND", &context.end_time)?);
        Ok(event.done())
    }
}

impl TemplateEngine for IcsTemplate {
    fn render(&self, template_name: &str, context: &CalendarContext) -> CalendarResult<String> {
        if template_name != ICS_TEMPLATE {
            return Err(CalendarError::Render(format!(
                "unknown template '{}'",
                template_name
            )));
        }

        let mut calendar = IcsCalendar::new();
        calendar.name(&context.title);
        for event in &context.events {
            calendar.push(Self::event(event)?);
        }
        Ok(calendar.done().to_string())
    }
}

/// Turns `"EST:20240615T190000"` into `NAME;TZID=EST:20240615T190000` and
/// `"EST:20240615"` into `NAME;VALUE=DATE:20240615`.
fn time_property(name: &str, formatted: &str) -> CalendarResult<Property> {
    let (zone, stamp) = formatted.split_once(':').ok_or_else(|| {
        CalendarError::Render(format!("{} value {:?} has no zone prefix", name, formatted))
    })?;

    let mut property = Property::new(name, stamp);
    if stamp.contains('T') {
        property.add_parameter("TZID", zone);
    } else {
        property.add_parameter("VALUE", "DATE");
    }
    Ok(property)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(start: &str, end: &str, url: &str) -> EventContext {
        EventContext {
            uid: format!("rangers-{}", start),
            title: "Rangers vs Lions".to_string(),
            description: "Season opener".to_string(),
            location: "City Park".to_string(),
            url: url.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    fn render(events: Vec<EventContext>) -> String {
        let context = CalendarContext {
            title: "Rangers Home Games".to_string(),
            events,
        };
        IcsTemplate::new().render(ICS_TEMPLATE, &context).unwrap()
    }

    #[test]
    fn timed_event() {
        let ics = render(vec![event(
            "EST:20240615T190000",
            "EST:20240615T210000",
            "http://example.com/schedule/42",
        )]);
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.contains("X-WR-CALNAME:Rangers Home Games"));
        assert!(ics.contains("UID:rangers-EST:20240615T190000"));
        assert!(ics.contains("SUMMARY:Rangers vs Lions"));
        assert!(ics.contains("LOCATION:City Park"));
        assert!(ics.contains("URL:http://example.com/schedule/42"));
        assert!(ics.contains("DTSTART;TZID=EST:20240615T190000"));
        assert!(ics.contains("DTEND;TZID=EST:20240615T210000"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }

    #[test]
    fn all_day_event_without_url() {
        let ics = render(vec![event("EST:20240615", "EST:20240615", "")]);
        assert!(ics.contains("DTSTART;VALUE=DATE:20240615"));
        assert!(ics.contains("DTEND;VALUE=DATE:20240615"));
        assert!(!ics.contains("\nURL:"));
    }

    #[test]
    fn one_block_per_event() {
        let ics = render(vec![
            event("EST:20240615T190000", "EST:20240615T210000", ""),
            event("EST:20240616T130000", "EST:20240616T150000", ""),
        ]);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.find("20240615T190000").unwrap() < ics.find("20240616T130000").unwrap());
    }

    #[test]
    fn empty_calendar() {
        let ics = render(Vec::new());
        assert!(ics.contains("END:VCALENDAR"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 0);
    }

    #[test]
    fn unknown_template() {
        let err = IcsTemplate::new()
            .render("calendar.html", &CalendarContext::default())
            .unwrap_err();
        assert!(matches!(err, CalendarError::Render(ref m) if m.contains("calendar.html")));
    }

    #[test]
    fn missing_zone_prefix_is_render_error() {
        assert!(time_property("DTSTART", "20240615").is_err());
    }
}
