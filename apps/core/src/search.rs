use chrono::{DateTime, Utc};

use crate::model::{IndexItem, ItemType};
use crate::patterns::CommandPatterns;
use crate::usage::{popularity_boost, UsageCounts};

const STARTS_WITH_BONUS: f64 = 2.0;
const PREFIX_BOOST: f64 = 2.0;
const STREAK_STEP: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored<'a> {
    pub item: &'a IndexItem,
    pub score: f64,
}

/// Scores index items against the launcher query using one snapshot of the
/// usage counts and learned patterns.
///
/// The learned-pattern boost only lifts `cmd` and `learned` rows. The
/// launcher never ranks those (learned rows keep their suggestion order),
/// so the boost applies to callers that rank command rows themselves.
pub struct Ranker<'a> {
    counts: &'a UsageCounts,
    patterns: &'a CommandPatterns,
    analytics_enabled: bool,
    now: DateTime<Utc>,
}

impl<'a> Ranker<'a> {
    pub fn new(
        counts: &'a UsageCounts,
        patterns: &'a CommandPatterns,
        analytics_enabled: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            counts,
            patterns,
            analytics_enabled,
            now,
        }
    }

    pub fn rank<'i>(&self, query: &str, items: &'i [IndexItem]) -> Vec<Scored<'i>> {
        let query = query.trim();
        let mut scored: Vec<(usize, Scored<'i>)> = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                self.score_item(query, item)
                    .map(|score| (index, Scored { item, score }))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.score
                .total_cmp(&a.1.score)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.into_iter().map(|(_, scored)| scored).collect()
    }

    /// Total score for one item, or `None` when it is excluded from the
    /// results for this query.
    pub fn score_item(&self, query: &str, item: &IndexItem) -> Option<f64> {
        let query = query.trim();
        if query.is_empty() {
            return Some(self.popularity(item));
        }

        let text_score = fuzzy_score(query, &item.search_text);
        if text_score <= 0.0 {
            return None;
        }
        let score = text_score
            + self.popularity(item)
            + prefix_boost(query, item)
            + self.learned_boost(query, item);
        (score > 0.0).then_some(score)
    }

    pub fn popularity(&self, item: &IndexItem) -> f64 {
        if !self.analytics_enabled {
            return 0.0;
        }
        popularity_boost(self.counts.get(&item.usage_key()))
    }

    fn learned_boost(&self, query: &str, item: &IndexItem) -> f64 {
        match item.item_type {
            ItemType::Cmd | ItemType::Learned => {
                let label = item.command_text().unwrap_or(&item.label);
                self.patterns.boost_for(query, label, self.now)
            }
            _ => 0.0,
        }
    }
}

/// In-order subsequence score. Each matched character is worth
/// `1 + streak * 0.2`; any unmatched query character rejects the text.
pub fn fuzzy_score(query: &str, text: &str) -> f64 {
    let query: Vec<char> = query.to_lowercase().chars().collect();
    if query.is_empty() {
        return 1.0;
    }
    let text = text.to_lowercase();

    let mut matched = 0;
    let mut score = 0.0;
    let mut streak = 0u32;
    for ch in text.chars() {
        if matched == query.len() {
            break;
        }
        if ch == query[matched] {
            score += 1.0 + f64::from(streak) * STREAK_STEP;
            matched += 1;
            streak += 1;
        } else {
            streak = 0;
        }
    }

    if matched < query.len() {
        return 0.0;
    }
    let lowered_query: String = query.iter().collect();
    if text.starts_with(&lowered_query) {
        score += STARTS_WITH_BONUS;
    }
    score
}

pub fn prefix_boost(query: &str, item: &IndexItem) -> f64 {
    if item.search_text.starts_with(&query.to_lowercase()) {
        PREFIX_BOOST
    } else {
        0.0
    }
}
