//! Language codes and the legacy fallback ordering.
//!
//! A lookup for a specific language prefers a record in that exact language
//! and falls back to the neutral sentinel. The ordering that decides which of
//! several historical records "wins" is inherited behavior: the requested
//! code is three-way string-compared against the sentinel, which flips the
//! secondary sort direction, and ties within one language break on the
//! largest record id. It is kept as a pure comparator so its exact tie-break
//! semantics stay testable in isolation. Do not "fix" it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::{AliasId, AliasRecord};

/// The neutral ("language not specified") sentinel code.
pub const NEUTRAL_CODE: &str = "und";

/// A language code, or the neutral sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Creates a language from a code such as `"en"` or `"fr"`.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the neutral sentinel language.
    pub fn neutral() -> Self {
        Self(NEUTRAL_CODE.to_string())
    }

    /// Returns `true` if this is the neutral sentinel.
    pub fn is_neutral(&self) -> bool {
        self.0 == NEUTRAL_CODE
    }

    /// Returns the language code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Self(code)
    }
}

/// Returns `true` if a record in `record_language` may answer a lookup in
/// `requested`: the exact language, or the neutral fallback.
pub fn is_candidate(requested: &Language, record_language: &Language) -> bool {
    record_language == requested || record_language.is_neutral()
}

/// The legacy fallback comparator.
///
/// Orders two lookup candidates, given as `(language, id)` pairs, for a
/// request in `requested`. The candidate that sorts `Less` is the winning
/// row. Secondary language direction depends on how the requested code
/// string-compares against [`NEUTRAL_CODE`]; within the same language the
/// larger id (most recently created) sorts first.
pub fn compare_candidates(
    requested: &Language,
    a: (&Language, AliasId),
    b: (&Language, AliasId),
) -> Ordering {
    let by_language = match requested.as_str().cmp(NEUTRAL_CODE) {
        // Neutral request: only neutral candidates exist, id decides.
        Ordering::Equal => Ordering::Equal,
        Ordering::Less => a.0.as_str().cmp(b.0.as_str()),
        Ordering::Greater => b.0.as_str().cmp(a.0.as_str()),
    };
    by_language.then_with(|| b.1.cmp(&a.1))
}

/// Picks the winning record for `requested` out of an iterator of stored
/// records, applying [`is_candidate`] filtering and [`compare_candidates`]
/// ordering. Records without an id (never saved) rank last within their
/// language.
pub fn best_match<'a, I>(requested: &Language, records: I) -> Option<&'a AliasRecord>
where
    I: IntoIterator<Item = &'a AliasRecord>,
{
    records
        .into_iter()
        .filter(|r| is_candidate(requested, &r.language))
        .min_by(|a, b| {
            compare_candidates(
                requested,
                (&a.language, a.id.unwrap_or(0)),
                (&b.language, b.id.unwrap_or(0)),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: AliasId, source: &str, alias: &str, language: Language) -> AliasRecord {
        AliasRecord::new(source, alias, language).with_id(id)
    }

    #[test]
    fn test_neutral_sentinel() {
        assert!(Language::neutral().is_neutral());
        assert!(!Language::new("en").is_neutral());
        assert_eq!(Language::neutral().as_str(), NEUTRAL_CODE);
    }

    #[test]
    fn test_candidate_filter() {
        let en = Language::new("en");
        assert!(is_candidate(&en, &en));
        assert!(is_candidate(&en, &Language::neutral()));
        assert!(!is_candidate(&en, &Language::new("fr")));
    }

    #[test]
    fn test_specific_language_beats_neutral() {
        // "en" sorts below "und": ascending language order, "en" first.
        let neutral = rec(9, "user/42", "alice", Language::neutral());
        let en = rec(5, "user/42", "users/alice", Language::new("en"));
        let winner = best_match(&Language::new("en"), [&neutral, &en]);
        assert_eq!(winner.unwrap().alias, "users/alice");
    }

    #[test]
    fn test_language_above_sentinel_flips_order() {
        // "zh" sorts above "und": descending language order, "zh" still first.
        let neutral = rec(9, "user/42", "alice", Language::neutral());
        let zh = rec(5, "user/42", "users/zh-alice", Language::new("zh"));
        let winner = best_match(&Language::new("zh"), [&neutral, &zh]);
        assert_eq!(winner.unwrap().alias, "users/zh-alice");
    }

    #[test]
    fn test_other_language_falls_back_to_neutral() {
        let neutral = rec(3, "user/42", "alice", Language::neutral());
        let en = rec(7, "user/42", "users/alice", Language::new("en"));
        let winner = best_match(&Language::new("fr"), [&neutral, &en]);
        assert_eq!(winner.unwrap().alias, "alice");
    }

    #[test]
    fn test_largest_id_wins_within_language() {
        let older = rec(3, "user/42", "alice", Language::neutral());
        let newer = rec(8, "user/42", "alicia", Language::neutral());
        let winner = best_match(&Language::neutral(), [&older, &newer]);
        assert_eq!(winner.unwrap().alias, "alicia");
    }

    #[test]
    fn test_comparator_is_deterministic() {
        let en = Language::new("en");
        let a = (&en, 5u64);
        let neutral = Language::neutral();
        let b = (&neutral, 9u64);
        assert_eq!(compare_candidates(&en, a, b), Ordering::Less);
        assert_eq!(compare_candidates(&en, b, a), Ordering::Greater);
        assert_eq!(compare_candidates(&en, a, a), Ordering::Equal);
    }
}
