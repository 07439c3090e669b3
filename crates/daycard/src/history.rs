//! Rolling word history and the banned-word window.
//!
//! [`History`] is kept in append order and never re-sorted by date, so "most
//! recent" always means "appended last" even when two entries share a date.
//!
//! Loading is lenient at every level. A `null` or non-string `word` reads as
//! empty, a `null` or non-array `items` reads as no items, the `date` is kept
//! as written, and an entry that is not an object is skipped on its own.
//! One bad record never costs the rest of the history.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::cards::TodaySet;

/// Number of days a word stays banned, and the history cap.
pub const DEFAULT_HISTORY_WINDOW: usize = 14;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryItem {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub word: String,
}

/// One past day's chosen words.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Calendar date as stored, normally `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<HistoryItem>,
}

impl HistoryEntry {
    pub fn from_today(date: NaiveDate, today: &TodaySet) -> Self {
        Self {
            date: date.to_string(),
            items: today
                .words()
                .iter()
                .map(|w| HistoryItem {
                    word: (*w).to_string(),
                })
                .collect(),
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_items<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<HistoryItem>, D::Error> {
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Ordered sequence of [`HistoryEntry`], oldest first.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct History(Vec<HistoryEntry>);

impl<'de> Deserialize<'de> for History {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<Value>::deserialize(deserializer)?;
        let entries: Vec<HistoryEntry> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping history entry {index}: {e}");
                    None
                }
            })
            .collect();
        Ok(Self(entries))
    }
}

impl History {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last `window` entries in append order.
    pub fn recent(&self, window: usize) -> &[HistoryEntry] {
        let start = self.0.len().saturating_sub(window);
        &self.0[start..]
    }

    /// Collect the trimmed, non-empty words of the last `window` entries.
    pub fn banned_words(&self, window: usize) -> BannedWords {
        BannedWords(
            self.recent(window)
                .iter()
                .flat_map(|entry| entry.items.iter())
                .map(|item| item.word.trim())
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Append `entry` and drop the oldest entries beyond `cap`.
    pub fn push_capped(&mut self, entry: HistoryEntry, cap: usize) {
        self.0.push(entry);
        let excess = self.0.len().saturating_sub(cap);
        if excess > 0 {
            self.0.drain(..excess);
        }
    }
}

/// Words that must not be reused. Membership is exact string equality.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BannedWords(HashSet<String>);

impl BannedWords {
    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Words in lexicographic order, for stable prompts and listings.
    pub fn sorted(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.0.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }
}

impl<S: Into<String>> FromIterator<S> for BannedWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::fixtures::today_set;

    fn day(n: u32, words: &[&str]) -> HistoryEntry {
        HistoryEntry {
            date: format!("2024-01-{n:02}"),
            items: words
                .iter()
                .map(|w| HistoryItem {
                    word: (*w).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn empty_history_bans_nothing() {
        let banned = History::default().banned_words(DEFAULT_HISTORY_WINDOW);
        assert!(banned.is_empty());
    }

    #[test]
    fn words_are_trimmed_deduplicated_and_non_empty() {
        let history = History::new(vec![
            day(1, &["  deadline ", "", "   "]),
            day(2, &["deadline", "postpone"]),
        ]);
        let banned = history.banned_words(14);
        assert_eq!(banned.sorted(), vec!["deadline", "postpone"]);
        assert!(!banned.contains("  deadline "));
    }

    #[test]
    fn only_the_last_window_entries_count() {
        let entries: Vec<HistoryEntry> = (1..=20)
            .map(|n| day(n, &[format!("w{n}").as_str()]))
            .collect();
        let history = History::new(entries);
        let banned = history.banned_words(14);
        assert_eq!(banned.len(), 14);
        assert!(!banned.contains("w6"));
        assert!(banned.contains("w7"));
        assert!(banned.contains("w20"));
    }

    #[test]
    fn window_follows_append_order_not_dates() {
        // Dates go backwards; the appended-last entries still win.
        let history = History::new(vec![day(9, &["old"]), day(3, &["new"])]);
        let banned = history.banned_words(1);
        assert!(banned.contains("new"));
        assert!(!banned.contains("old"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let history = History::new(vec![day(1, &["Deadline"])]);
        let banned = history.banned_words(14);
        assert!(banned.contains("Deadline"));
        assert!(!banned.contains("deadline"));
    }

    #[test]
    fn push_capped_keeps_most_recent() {
        let mut history = History::new((1..=14).map(|n| day(n, &["x"])).collect());
        history.push_capped(day(15, &["y"]), 14);
        assert_eq!(history.len(), 14);
        assert_eq!(history.entries()[0].date, "2024-01-02");
        assert_eq!(history.entries()[13].date, "2024-01-15");
    }

    #[test]
    fn push_capped_grows_short_history() {
        let mut history = History::new(vec![day(1, &["x"])]);
        history.push_capped(day(2, &["y"]), 14);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn entry_from_today_lists_words_in_order() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let entry = HistoryEntry::from_today(date, &today_set(["a", "b", "c"]));
        let words: Vec<&str> = entry.items.iter().map(|i| i.word.as_str()).collect();
        assert_eq!(words, vec!["a", "b", "c"]);
        assert_eq!(entry.date, "2024-01-02");
    }

    #[test]
    fn document_format_matches_stored_history() {
        let raw = r#"[{"date":"2024-01-01","items":[{"word":"deadline"}]}]"#;
        let history: History = serde_json::from_str(raw).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].items[0].word, "deadline");
        assert_eq!(serde_json::to_string(&history).unwrap(), raw);
    }

    #[test]
    fn tolerates_missing_items_and_words() {
        let raw = r#"[{"date":"2024-01-01"},{"date":"2024-01-02","items":[{}]}]"#;
        let history: History = serde_json::from_str(raw).unwrap();
        assert!(history.banned_words(14).is_empty());
    }

    #[test]
    fn null_word_does_not_discard_other_entries() {
        let raw = r#"[
            {"date":"2024-01-01","items":[{"word":"deadline"}]},
            {"date":"2024-01-02","items":[{"word":null},{"word":5},{"word":" postpone "}]}
        ]"#;
        let history: History = serde_json::from_str(raw).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.banned_words(14).sorted(), vec!["deadline", "postpone"]);
    }

    #[test]
    fn null_items_and_odd_dates_are_kept() {
        let raw = r#"[
            {"date":"2024-01-01","items":null},
            {"date":"Jan 2nd","items":[{"word":"deadline"}]},
            {"date":null,"items":[{"word":"circle back"}, "stray"]}
        ]"#;
        let history: History = serde_json::from_str(raw).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.entries()[0].items.is_empty());
        assert_eq!(history.entries()[1].date, "Jan 2nd");
        assert_eq!(history.entries()[2].date, "");
        assert_eq!(
            history.banned_words(14).sorted(),
            vec!["circle back", "deadline"]
        );
    }

    #[test]
    fn non_object_entries_are_skipped_individually() {
        let raw = r#"[null, "junk", {"date":"2024-01-03","items":[{"word":"deadline"}]}]"#;
        let history: History = serde_json::from_str(raw).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history.banned_words(14).contains("deadline"));
    }
}
