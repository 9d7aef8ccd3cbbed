//! RSS and Atom feed parsing.
//!
//! Turns a feed document into [`FeedItem`]s using `quick-xml` events. Both
//! dialects are handled by one pass:
//!
//! | Field | RSS 2.0 `<item>` | Atom `<entry>` |
//! |-------|------------------|----------------|
//! | title | `<title>` | `<title>` |
//! | link | `<link>` text | `<link href>` (`rel="alternate"` preferred) |
//! | description | `<description>`, else `<content:encoded>` | `<summary>`, else `<content>` |
//! | published | `<pubDate>` / `<dc:date>` | `<published>`, else `<updated>` |
//!
//! Descriptions and titles are reduced to plain text: HTML tags are
//! stripped, entities decoded, and whitespace collapsed.

use std::borrow::Cow;
use std::sync::OnceLock;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use feed_monitor_core::models::FeedItem;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::config::FeedConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    Content,
    Published,
    Updated,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Field> {
        match name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" | b"summary" => Some(Field::Description),
            b"content:encoded" | b"content" => Some(Field::Content),
            b"pubDate" | b"published" | b"dc:date" => Some(Field::Published),
            b"updated" => Some(Field::Updated),
            _ => None,
        }
    }
}

#[derive(Default)]
struct EntryBuilder {
    title: String,
    link: String,
    alternate_link: Option<String>,
    first_link: Option<String>,
    description: String,
    content: String,
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl EntryBuilder {
    fn set(&mut self, field: Field, text: &str) {
        match field {
            Field::Title => self.title = clean_text(text),
            Field::Link => {
                if !text.trim().is_empty() {
                    self.link = text.trim().to_string();
                }
            }
            Field::Description => self.description = clean_text(text),
            Field::Content => self.content = clean_text(text),
            Field::Published => self.published = parse_date(text),
            Field::Updated => self.updated = parse_date(text),
        }
    }

    fn push_link_attrs(&mut self, e: &BytesStart<'_>) {
        let mut href = None;
        let mut rel = None;
        for attr in e.attributes().flatten() {
            let value = attr
                .unescape_value()
                .map(Cow::into_owned)
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            match attr.key.as_ref() {
                b"href" => href = Some(value),
                b"rel" => rel = Some(value),
                _ => {}
            }
        }
        let Some(href) = href else { return };
        if matches!(rel.as_deref(), None | Some("alternate")) && self.alternate_link.is_none() {
            self.alternate_link = Some(href.clone());
        }
        if self.first_link.is_none() {
            self.first_link = Some(href);
        }
    }

    fn build(self, feed: &FeedConfig) -> Option<FeedItem> {
        let link = if !self.link.is_empty() {
            self.link
        } else {
            self.alternate_link.or(self.first_link).unwrap_or_default()
        };
        if self.title.is_empty() && link.is_empty() {
            return None;
        }
        let description = if self.description.is_empty() {
            self.content
        } else {
            self.description
        };
        Some(FeedItem {
            title: self.title,
            link,
            published_at: self.published.or(self.updated),
            description,
            source_name: feed.name.clone(),
            source_category: feed.category.clone(),
        })
    }
}

/// Parse an RSS 2.0 or Atom document into feed items, in document order.
///
/// # Errors
///
/// Returns an error if the document is not well-formed XML.
pub fn parse_feed(xml: &str, feed: &FeedConfig) -> Result<Vec<FeedItem>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    // Depth of non-field children inside the current entry.
    let mut child_depth = 0usize;
    // Field being captured, with nesting depth inside it.
    let mut field: Option<(Field, usize)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if let Some((_, depth)) = field.as_mut() {
                    *depth += 1;
                    continue;
                }
                let name = e.name();
                let name = name.as_ref();
                if name == b"item" || name == b"entry" {
                    entry = Some(EntryBuilder::default());
                    child_depth = 0;
                    continue;
                }
                let Some(builder) = entry.as_mut() else {
                    continue;
                };
                match Field::from_name(name) {
                    Some(f) if child_depth == 0 => {
                        if f == Field::Link {
                            builder.push_link_attrs(&e);
                        }
                        field = Some((f, 0));
                        text.clear();
                    }
                    _ => child_depth += 1,
                }
            }
            Ok(Event::Empty(e)) => {
                if field.is_none() && child_depth == 0 && e.name().as_ref() == b"link" {
                    if let Some(builder) = entry.as_mut() {
                        builder.push_link_attrs(&e);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if field.is_some() {
                    let piece = t
                        .unescape()
                        .map(Cow::into_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    push_piece(&mut text, &piece);
                }
            }
            Ok(Event::CData(c)) => {
                if field.is_some() {
                    push_piece(&mut text, &String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                if let Some((f, depth)) = field.as_mut() {
                    if *depth > 0 {
                        *depth -= 1;
                        continue;
                    }
                    let f = *f;
                    field = None;
                    if let Some(builder) = entry.as_mut() {
                        builder.set(f, &text);
                    }
                    continue;
                }
                let name = e.name();
                if name.as_ref() == b"item" || name.as_ref() == b"entry" {
                    if let Some(item) = entry.take().and_then(|b| b.build(feed)) {
                        items.push(item);
                    }
                } else if entry.is_some() {
                    child_depth = child_depth.saturating_sub(1);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!(
                "malformed feed XML at position {}: {}",
                reader.buffer_position(),
                e
            ),
            _ => {}
        }
    }

    Ok(items)
}

fn push_piece(buf: &mut String, piece: &str) {
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(piece);
}

/// Parse an RFC 2822 (`pubDate`) or RFC 3339 (Atom, `dc:date`) timestamp.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Reduce an HTML fragment to collapsed plain text.
pub fn clean_text(raw: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"));
    let stripped = tags.replace_all(raw, " ");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(raw: &str) -> String {
    let raw = raw.replace("&nbsp;", " ");
    match quick_xml::escape::unescape(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}
