use crate::snapshot::NewsItem;

/// Newest first, keeping input order among equal timestamps, cut to `max_items`.
pub fn rank(mut items: Vec<NewsItem>, max_items: usize) -> Vec<NewsItem> {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    items.truncate(max_items);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn item(title: &str, minutes: i64) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            source: "Test".to_string(),
            summary: None,
            description: None,
            link: format!("https://example.com/{}", title),
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_sorts_newest_first() {
        let ranked = rank(vec![item("a", 1), item("b", 3), item("c", 2)], 20);
        let titles: Vec<&str> = ranked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(vec![item("x", 5), item("y", 5), item("z", 9)], 20);
        let titles: Vec<&str> = ranked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_truncates_to_cap() {
        let items: Vec<NewsItem> = (0..30).map(|i| item(&format!("n{}", i), i)).collect();
        let ranked = rank(items, 20);

        assert_eq!(ranked.len(), 20);
        assert_eq!(ranked[0].title, "n29");
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].published_at >= pair[1].published_at));
    }

    #[test]
    fn test_fewer_than_cap() {
        assert_eq!(rank(vec![item("only", 0)], 20).len(), 1);
        assert!(rank(Vec::new(), 20).is_empty());
    }
}
