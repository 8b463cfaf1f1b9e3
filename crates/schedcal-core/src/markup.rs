//! Markup cleanup for scraped field values.
//!
//! Field values arrive as inner HTML. Plain-text fields only need the markup
//! stripped and entities decoded ([`clean_text`]). Descriptions additionally
//! keep their paragraph structure and move hyperlinks out of the running text
//! into trailing `"<text>:\n<url>"` entries ([`split_description`]).

use scraper::{ElementRef, Html};

use crate::links::{DescriptionLink, resolve_url};

/// Separator between description paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Elements whose content never contributes text.
const SKIPPED: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start and end a paragraph.
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "footer", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "li", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// A description split into body paragraphs and lifted links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitDescription {
    /// Body paragraphs with links removed, whitespace collapsed.
    pub paragraphs: Vec<String>,
    /// Links in document order.
    pub links: Vec<DescriptionLink>,
}

impl SplitDescription {
    /// Joins body paragraphs and link entries with blank lines.
    pub fn render(&self) -> String {
        self.paragraphs
            .iter()
            .cloned()
            .chain(self.links.iter().map(DescriptionLink::to_paragraph))
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR)
    }
}

/// Strips markup, decodes entities and collapses whitespace.
pub fn clean_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    let mut collector = Collector::new(None, false);
    collector.walk(fragment.root_element());
    collector.finish().paragraphs.join(" ")
}

/// Splits a description fragment into paragraphs and links.
///
/// Relative link targets are resolved against `base_url`. A link with no
/// visible text uses its URL as text.
pub fn split_description(html: &str, base_url: Option<&str>) -> SplitDescription {
    if html.trim().is_empty() {
        return SplitDescription::default();
    }
    let fragment = Html::parse_fragment(html);
    let mut collector = Collector::new(base_url, true);
    collector.walk(fragment.root_element());
    collector.finish()
}

/// Collapses runs of whitespace to single spaces and trims.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct Collector<'a> {
    base_url: Option<&'a str>,
    lift_links: bool,
    current: String,
    out: SplitDescription,
}

impl<'a> Collector<'a> {
    fn new(base_url: Option<&'a str>, lift_links: bool) -> Self {
        Self {
            base_url,
            lift_links,
            current: String::new(),
            out: SplitDescription::default(),
        }
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                let name = child_element.value().name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                if name == "br" {
                    self.flush();
                    continue;
                }
                if name == "a"
                    && self.lift_links
                    && let Some(href) = child_element.value().attr("href")
                {
                    self.lift(child_element, href);
                    continue;
                }
                let block = BLOCKS.contains(&name);
                if block {
                    self.flush();
                }
                self.walk(child_element);
                if block {
                    self.flush();
                }
            } else if let Some(text) = child.value().as_text() {
                self.current.push_str(text);
            }
        }
    }

    fn lift(&mut self, anchor: ElementRef<'_>, href: &str) {
        let url = resolve_url(href, self.base_url);
        if url.is_empty() {
            return;
        }
        let text = collapse_whitespace(&anchor.text().collect::<String>());
        let text = if text.is_empty() { url.clone() } else { text };
        self.out.links.push(DescriptionLink::new(text, url));
    }

    fn flush(&mut self) {
        let paragraph = collapse_whitespace(&self.current);
        self.current.clear();
        if !paragraph.is_empty() {
            self.out.paragraphs.push(paragraph);
        }
    }

    fn finish(mut self) -> SplitDescription {
        self.flush();
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod text {
        use super::*;

        #[test]
        fn strips_tags_and_decodes_entities() {
            assert_eq!(
                clean_text("  <strong>Rangers</strong> &amp; Friends&nbsp;vs. <em>Lions</em> "),
                "Rangers & Friends vs. Lions"
            );
        }

        #[test]
        fn block_boundaries_become_spaces() {
            assert_eq!(clean_text("<p>Main</p><p>Stage</p>"), "Main Stage");
            assert_eq!(clean_text("Main<br>Stage"), "Main Stage");
        }

        #[test]
        fn keeps_link_text_in_plain_fields() {
            assert_eq!(
                clean_text(r#"at <a href="/venue">City Park</a>"#),
                "at City Park"
            );
        }

        #[test]
        fn empty_and_plain() {
            assert_eq!(clean_text(""), "");
            assert_eq!(clean_text("   "), "");
            assert_eq!(clean_text("AT&T Stadium"), "AT&T Stadium");
            assert_eq!(clean_text("<script>x()</script>Hi"), "Hi");
        }
    }

    mod description {
        use super::*;

        #[test]
        fn two_links_follow_body_in_order() {
            let html = r#"Join us for the opener.
                <a href="https://tickets.example.com/1">Buy tickets</a>
                Gates open early.
                <a href="/info/1">More info</a>"#;
            let split = split_description(html, Some("http://example.com"));

            assert_eq!(
                split.paragraphs,
                vec!["Join us for the opener. Gates open early.".to_string()]
            );
            assert_eq!(
                split.links,
                vec![
                    DescriptionLink::new("Buy tickets", "https://tickets.example.com/1"),
                    DescriptionLink::new("More info", "http://example.com/info/1"),
                ]
            );
            assert_eq!(
                split.render(),
                "Join us for the opener. Gates open early.\n\n\
                 Buy tickets:\nhttps://tickets.example.com/1\n\n\
                 More info:\nhttp://example.com/info/1"
            );
        }

        #[test]
        fn paragraphs_are_blank_line_separated() {
            let split = split_description("<p>First line</p><p>Second &amp; last</p>", None);
            assert_eq!(split.render(), "First line\n\nSecond & last");
        }

        #[test]
        fn anchor_without_href_stays_in_body() {
            let split = split_description(r#"See <a name="x">below</a>"#, None);
            assert_eq!(split.render(), "See below");
            assert!(split.links.is_empty());
        }

        #[test]
        fn anchor_without_text_uses_url() {
            let split = split_description(r#"<a href="https://x.example/"></a>"#, None);
            assert_eq!(split.render(), "https://x.example/:\nhttps://x.example/");
        }

        #[test]
        fn empty_description() {
            assert_eq!(split_description("", None).render(), "");
        }
    }
}
