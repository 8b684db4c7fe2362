//! RSS 2.0 serialization.
//!
//! Two layouts share one writer:
//!
//! - [`FeedStyle::Full`]: every item carries `title`, `link`, `description`
//!   and a permalink `guid`; the channel carries `lastBuildDate`.
//! - [`FeedStyle::Compact`]: items carry `title`, `link` and `guid` only
//!   (plus `description` when one exists); the channel adds `pubDate` and
//!   `ttl`.
//!
//! Both declare the Atom namespace and a self-referencing `atom:link`, and
//! both emit `pubDate` on an item only when it has a parseable date. The
//! output is deterministic except for the build timestamps.
//!
//! # Text escaping
//!
//! All free text and attribute values first lose the code points XML 1.0
//! forbids (C0 controls other than tab, newline and carriage return, plus
//! U+FFFE and U+FFFF), then go through [`quick_xml::escape::escape`], which
//! rewrites `<`, `>`, `&`, `'` and `"` as entities.

use crate::errors::FeedError;
use crate::models::{FeedItem, FeedMetadata};
use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Deserialize;
use std::borrow::Cow;
use std::io::Write;
use tracing::{debug, instrument, warn};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Item and channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedStyle {
    Full,
    Compact,
}

/// Format an instant as an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Drop the characters that may not appear anywhere in an XML 1.0 document.
pub fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

/// Parse an item date given as RFC 3339 or RFC 2822 text.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Serialize `items` into an RSS document built now.
pub fn serialize(
    style: FeedStyle,
    meta: &FeedMetadata,
    items: &[FeedItem],
) -> Result<String, FeedError> {
    serialize_at(style, meta, items, Utc::now())
}

/// Serialize `items` into an RSS document whose build time is `now`.
#[instrument(level = "debug", skip_all, fields(?style, items = items.len()))]
pub fn serialize_at(
    style: FeedStyle,
    meta: &FeedMetadata,
    items: &[FeedItem],
    now: DateTime<Utc>,
) -> Result<String, FeedError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let rss = BytesStart::new("rss").with_attributes([("version", "2.0"), ("xmlns:atom", ATOM_NS)]);
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", &meta.title)?;
    write_text_element(&mut writer, "link", &meta.site_url)?;
    write_text_element(
        &mut writer,
        "description",
        meta.description.as_deref().unwrap_or(&meta.title),
    )?;
    if let Some(language) = &meta.language {
        write_text_element(&mut writer, "language", language)?;
    }
    let build_date = http_date(now);
    if style == FeedStyle::Compact {
        write_text_element(&mut writer, "pubDate", &build_date)?;
    }
    write_text_element(&mut writer, "lastBuildDate", &build_date)?;
    if style == FeedStyle::Compact {
        if let Some(ttl) = meta.ttl {
            write_text_element(&mut writer, "ttl", &ttl.to_string())?;
        }
    }

    let feed_url = xml_safe(&meta.feed_url);
    let atom_link = BytesStart::new("atom:link").with_attributes([
        ("href", &*feed_url),
        ("rel", "self"),
        ("type", "application/rss+xml"),
    ]);
    writer.write_event(Event::Empty(atom_link))?;

    for item in items {
        write_item(&mut writer, style, item)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let xml = String::from_utf8(writer.into_inner())?;
    debug!(bytes = xml.len(), "Serialized RSS document");
    Ok(xml)
}

fn write_item<W: Write>(
    writer: &mut Writer<W>,
    style: FeedStyle,
    item: &FeedItem,
) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;
    write_text_element(writer, "title", &item.article.title)?;
    write_text_element(writer, "link", &item.article.link)?;

    match (style, item.description.as_deref()) {
        (FeedStyle::Full, description) => {
            write_text_element(writer, "description", description.unwrap_or_default())?
        }
        (FeedStyle::Compact, Some(description)) => {
            write_text_element(writer, "description", description)?
        }
        (FeedStyle::Compact, None) => {}
    }

    let guid = BytesStart::new("guid").with_attributes([("isPermaLink", "true")]);
    writer.write_event(Event::Start(guid))?;
    write_text(writer, &item.article.link)?;
    writer.write_event(Event::End(BytesEnd::new("guid")))?;

    if let Some(raw) = &item.pub_date {
        match parse_pub_date(raw) {
            Some(date) => write_text_element(writer, "pubDate", &http_date(date))?,
            None => warn!(pub_date = %raw, link = %item.article.link, "Dropping unparsable pubDate"),
        }
    }

    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    write_text(writer, text)?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_text<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<(), FeedError> {
    let text = xml_safe(text);
    writer.write_event(Event::Text(BytesText::from_escaped(escape(&*text))))?;
    Ok(())
}
