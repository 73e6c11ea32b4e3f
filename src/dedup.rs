use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::snapshot::NewsItem;

/// Words ignored when comparing titles, including the topic keyword itself.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "in", "on", "at", "to", "for", "from", "by", "with", "and", "or",
    "but", "as", "is", "are", "ai",
];

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&[a-z0-9#]+;").unwrap());

/// Keep the first item for each canonical link.
pub fn dedup_by_link(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.link.clone()))
        .collect()
}

/// Reduce a title to the words that identify the story.
pub fn title_key(title: &str, stop_words: &HashSet<String>) -> String {
    let lower = title.to_lowercase();
    let without_entities = ENTITY_RE.replace_all(&lower, " ");
    let cleaned: String = without_entities
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    let key = cleaned
        .split_whitespace()
        .filter(|word| !stop_words.contains(*word))
        .collect::<Vec<_>>()
        .join(" ");

    if key.is_empty() {
        lower.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        key
    }
}

/// Keep the first item per UTC publish day and normalized title.
pub fn dedup_by_day_title(items: Vec<NewsItem>, stop_words: &HashSet<String>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let day = item.published_at.format("%Y-%m-%d").to_string();
            seen.insert(format!("{}|{}", day, title_key(&item.title, stop_words)))
        })
        .collect()
}

/// Link identity first, then same-day title identity.
pub fn dedup(items: Vec<NewsItem>, stop_words: &HashSet<String>) -> Vec<NewsItem> {
    dedup_by_day_title(dedup_by_link(items), stop_words)
}

pub fn stop_word_set<S: AsRef<str>>(words: &[S]) -> HashSet<String> {
    words
        .iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
