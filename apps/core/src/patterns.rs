use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::local_store::{LocalStore, StoreError};

pub const PATTERNS_KEY: &str = "command-patterns";

const MIN_PREFIX_LEN: usize = 2;
const MAX_PREFIX_LEN: usize = 5;
const MAX_ENTRIES_PER_PREFIX: usize = 10;
const DECAY_AFTER_DAYS: i64 = 30;
pub const MAX_SUGGESTIONS: usize = 3;
const MIN_SUGGESTION_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub command: String,
    pub count: u32,
    #[serde(rename = "lastUsed", with = "chrono::serde::ts_milliseconds")]
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub command: String,
    pub score: f64,
}

/// Learned commands keyed by lower-cased prefix of the text that was run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandPatterns {
    by_prefix: BTreeMap<String, Vec<PatternEntry>>,
}

impl CommandPatterns {
    pub fn load(store: &LocalStore) -> Self {
        store.read_json_or_default(PATTERNS_KEY)
    }

    pub fn save(&self, store: &LocalStore) -> Result<(), StoreError> {
        store.write_json(PATTERNS_KEY, self)
    }

    pub fn entries(&self, prefix: &str) -> &[PatternEntry] {
        self.by_prefix
            .get(prefix)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn insert_entries(&mut self, prefix: &str, entries: Vec<PatternEntry>) {
        self.by_prefix.insert(prefix.to_string(), entries);
    }

    pub fn is_empty(&self) -> bool {
        self.by_prefix.is_empty()
    }

    /// Records one run of `command` under each of its short prefixes, then
    /// decays stale entries across the whole store.
    pub fn learn(&mut self, command: &str, now: DateTime<Utc>) {
        let command = command.trim();
        let len = command.chars().count();
        if len < MIN_PREFIX_LEN {
            return;
        }

        let lowered = command.to_lowercase();
        let longest = MAX_PREFIX_LEN.min(len - 1);
        for prefix_len in MIN_PREFIX_LEN..=longest {
            let prefix = char_prefix(&lowered, prefix_len);
            let entries = self.by_prefix.entry(prefix).or_default();
            match entries.iter_mut().find(|entry| entry.command == command) {
                Some(entry) => {
                    entry.count = entry.count.saturating_add(1);
                    entry.last_used = now;
                }
                None => entries.push(PatternEntry {
                    command: command.to_string(),
                    count: 1,
                    last_used: now,
                }),
            }
            entries.sort_by(|left, right| right.count.cmp(&left.count));
            entries.truncate(MAX_ENTRIES_PER_PREFIX);
        }

        self.decay(now);
    }

    /// Halves the count of every entry unused for more than 30 days, never
    /// below 1, and prunes whatever ends up empty.
    pub fn decay(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(DECAY_AFTER_DAYS);
        for entries in self.by_prefix.values_mut() {
            for entry in entries.iter_mut() {
                if entry.last_used < cutoff {
                    entry.count = (entry.count / 2).max(1);
                }
            }
            entries.retain(|entry| entry.count > 0);
        }
        self.by_prefix.retain(|_, entries| !entries.is_empty());
    }

    /// Up to three previously run commands sharing a prefix with `query`,
    /// best first.
    pub fn suggest(&self, query: &str, now: DateTime<Utc>) -> Vec<Suggestion> {
        let mut suggestions = self.ranked_suggestions(query, now);
        suggestions.truncate(MAX_SUGGESTIONS);
        suggestions
    }

    /// Every suggestion above the score floor, best first. Callers that
    /// filter rows before capping them at [`MAX_SUGGESTIONS`] start here.
    pub fn ranked_suggestions(&self, query: &str, now: DateTime<Utc>) -> Vec<Suggestion> {
        let mut best: HashMap<&str, f64> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        self.for_each_prefix_entry(query, |prefix_len, entry| {
            let score = entry_score(entry, prefix_len, now);
            match best.get_mut(entry.command.as_str()) {
                Some(existing) => *existing = existing.max(score),
                None => {
                    best.insert(entry.command.as_str(), score);
                    order.push(entry.command.as_str());
                }
            }
        });

        let mut suggestions: Vec<Suggestion> = order
            .into_iter()
            .filter_map(|command| {
                let score = best.get(command).copied().unwrap_or(0.0);
                (score > MIN_SUGGESTION_SCORE).then(|| Suggestion {
                    command: command.to_string(),
                    score,
                })
            })
            .collect();
        suggestions.sort_by(|left, right| right.score.total_cmp(&left.score));
        suggestions
    }

    /// Ranking boost for a candidate whose label is a learned command.
    pub fn boost_for(&self, query: &str, label: &str, now: DateTime<Utc>) -> f64 {
        let mut boost = 0.0_f64;
        self.for_each_prefix_entry(query, |prefix_len, entry| {
            if entry.command == label {
                boost = boost.max(entry_score(entry, prefix_len, now));
            }
        });
        boost
    }

    fn for_each_prefix_entry<'a>(
        &'a self,
        query: &str,
        mut visit: impl FnMut(usize, &'a PatternEntry),
    ) {
        let lowered = query.trim().to_lowercase();
        let longest = MAX_PREFIX_LEN.min(lowered.chars().count());
        for prefix_len in MIN_PREFIX_LEN..=longest {
            let prefix = char_prefix(&lowered, prefix_len);
            for entry in self.entries(&prefix) {
                visit(prefix_len, entry);
            }
        }
    }
}

/// Loads the stored patterns, learns one command and writes them back.
pub fn learn_command(
    store: &LocalStore,
    command: &str,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let mut patterns = CommandPatterns::load(store);
    patterns.learn(command, now);
    patterns.save(store)
}

fn entry_score(entry: &PatternEntry, prefix_len: usize, now: DateTime<Utc>) -> f64 {
    let count_boost = (f64::from(entry.count) / 3.0).min(3.0);
    let days = ((now - entry.last_used).num_milliseconds() as f64 / 86_400_000.0).max(0.0);
    let recency_boost = (1.0 - days / 7.0).max(0.0);
    let length_boost = prefix_len as f64 / 5.0;
    count_boost + recency_boost + length_boost
}

fn char_prefix(text: &str, len: usize) -> String {
    text.chars().take(len).collect()
}
