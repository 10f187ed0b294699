//! Keyword relevance scoring for résumé content units.
//!
//! Score = matched keywords / max(1, total keywords), clamped to [0, 1].
//! A keyword matches when it appears as a substring of the unit's lower-cased text.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Experience, Project};

/// Externally supplied job keywords, lower-cased and de-duplicated. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceContext {
    keywords: BTreeSet<String>,
}

impl RelevanceContext {
    /// Blank keywords are dropped; the rest are trimmed and lower-cased.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }
}

/// A content unit whose string fields can be scored against keywords.
pub trait Scorable {
    fn text_fields(&self) -> Vec<&str>;
}

impl Scorable for String {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl Scorable for Experience {
    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.title.as_str(),
            self.company.as_str(),
            self.duration.as_str(),
        ];
        fields.extend(self.bullets.iter().map(String::as_str));
        fields
    }
}

impl Scorable for Project {
    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.bullets.iter().map(String::as_str));
        fields.extend(self.technologies.iter().map(String::as_str));
        fields
    }
}

/// Scores one content unit. Returns 0.0 when there are no keywords.
pub fn score<T: Scorable + ?Sized>(item: &T, context: &RelevanceContext) -> f64 {
    let text = item.text_fields().join(" ").to_lowercase();
    let matched = context
        .keywords()
        .filter(|kw| text.contains(kw))
        .count();
    (matched as f64 / context.len().max(1) as f64).clamp(0.0, 1.0)
}

/// Returns the items sorted by descending score. Ties keep their original order.
pub fn rank_by_relevance<'a, T: Scorable>(items: &'a [T], context: &RelevanceContext) -> Vec<&'a T> {
    let mut scored: Vec<(&T, f64)> = items.iter().map(|item| (item, score(item, context))).collect();

    // sort_by is stable, which is what keeps ties in input order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    scored.into_iter().map(|(item, _)| item).collect()
}
