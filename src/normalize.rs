use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser::{Builder, Parser};
use regex::Regex;
use url::Url;

use crate::snapshot::NewsItem;

/// Query parameters dropped from links before they are used as identity.
const TRACKING_PARAMS: &[&str] = &["utm_source", "utm_medium", "utm_campaign"];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&[a-zA-Z0-9#]+;").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Feed parser that leaves missing entry ids empty instead of generating one.
pub fn feed_parser() -> Parser {
    Builder::new().id_generator(|_, _, _| String::new()).build()
}

/// Loosely typed view of one feed entry. Nothing here is trusted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub snippet: Option<String>,
    pub encoded_content: Option<String>,
    pub description: Option<String>,
}

impl RawEntry {
    pub fn from_entry(entry: Entry) -> Self {
        Self {
            title: entry.title.map(|t| t.content),
            link: entry.links.into_iter().next().map(|l| l.href),
            guid: Some(entry.id).filter(|id| !id.is_empty()),
            published: entry.published.map(|dt| dt.to_rfc3339()),
            updated: entry.updated.map(|dt| dt.to_rfc3339()),
            snippet: entry.summary.map(|s| s.content),
            encoded_content: entry.content.and_then(|c| c.body),
            description: entry
                .media
                .into_iter()
                .find_map(|m| m.description)
                .map(|d| d.content),
        }
    }
}

type Extractor = fn(&RawEntry) -> Option<&str>;

fn link(e: &RawEntry) -> Option<&str> {
    e.link.as_deref()
}

fn guid(e: &RawEntry) -> Option<&str> {
    e.guid.as_deref()
}

fn published(e: &RawEntry) -> Option<&str> {
    e.published.as_deref()
}

fn updated(e: &RawEntry) -> Option<&str> {
    e.updated.as_deref()
}

fn snippet(e: &RawEntry) -> Option<&str> {
    e.snippet.as_deref()
}

fn encoded_content(e: &RawEntry) -> Option<&str> {
    e.encoded_content.as_deref()
}

fn description(e: &RawEntry) -> Option<&str> {
    e.description.as_deref()
}

// Candidates per logical field, in order of preference
const LINK_FIELDS: &[Extractor] = &[link, guid];
const DATE_FIELDS: &[Extractor] = &[published, updated];
const CONTENT_FIELDS: &[Extractor] = &[snippet, encoded_content, description];

/// First candidate that yields non-blank text.
fn first_non_empty<'a>(entry: &'a RawEntry, fields: &[Extractor]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|field| field(entry))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Convert a raw entry into a news item, or `None` if it lacks a title, link or date.
pub fn normalize(entry: &RawEntry, source: &str) -> Option<NewsItem> {
    let title = entry.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    let link = canonicalize_url(first_non_empty(entry, LINK_FIELDS)?);
    let published_at = DATE_FIELDS
        .iter()
        .filter_map(|field| field(entry))
        .find_map(parse_timestamp)?;

    let description = first_non_empty(entry, CONTENT_FIELDS)
        .map(strip_html)
        .filter(|d| !d.is_empty());
    let summary = description
        .as_deref()
        .map(summarize)
        .filter(|s| !s.is_empty());

    Some(NewsItem {
        title: title.to_string(),
        source: source.to_string(),
        summary,
        description,
        link,
        published_at,
    })
}

/// Strip tracking parameters and the fragment. Unparseable input passes through.
pub fn canonicalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    url.to_string()
}

/// Parse the date formats feeds are seen to emit. Zone-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Remove tags and entities and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    let text = ENTITY_RE.replace_all(&text, " ");
    SPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Split text at runs of `.`, `!` or `?` followed by whitespace or the end.
/// The terminators are dropped and empty fragments discarded.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !matches!(next, '.' | '!' | '?') {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        let at_boundary = match chars.peek() {
            Some(&(_, next)) => next.is_whitespace(),
            None => true,
        };
        if at_boundary {
            out.push(&text[start..i]);
            start = end;
        }
    }
    out.push(&text[start..]);

    out.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// At most the first two sentences, joined by a single space.
pub fn summarize(text: &str) -> String {
    sentences(text).into_iter().take(2).collect::<Vec<_>>().join(" ")
}
