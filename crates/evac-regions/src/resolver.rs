//! Free-text place-name resolution.
//!
//! # Scoring contract
//!
//! Whatever [`Similarity`] metric is plugged in, [`FuzzyResolver`] applies
//! the same rules on top of it:
//!
//! | Query vs. candidate (both normalized)     | Score                    |
//! |-------------------------------------------|--------------------------|
//! | empty query                               | no match                 |
//! | equal                                     | 100                      |
//! | one contains the other                    | `max(metric, 90)`        |
//! | otherwise                                 | `metric`, capped at 99   |
//!
//! The highest-scoring candidate wins; equal scores keep the earliest
//! candidate.  A match is accepted only when its score is at least the
//! caller's threshold.  Queries longer than [`MAX_QUERY_CHARS`] characters
//! (after normalization) are cut to that length before scoring.

use rapidfuzz::fuzz;

use evac_core::RegionId;

use crate::region::normalize_name;

/// Threshold for interactive lookups.
pub const DEFAULT_MATCH_THRESHOLD: u8 = 40;
/// Threshold where a wrong guess is costly (e.g. picking an evacuation origin
/// without confirmation).
pub const STRICT_MATCH_THRESHOLD: u8 = 50;

/// Queries are scored on at most this many characters; the rest is ignored.
pub const MAX_QUERY_CHARS: usize = 256;

/// Floor applied when one string contains the other.
const CONTAINMENT_SCORE: u8 = 90;

// ── Similarity metric ─────────────────────────────────────────────────────────

/// Pluggable string similarity on normalized inputs.
pub trait Similarity: Send + Sync {
    /// Similarity of `a` and `b` in `0..=100`.  Must be deterministic.
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Normalized indel similarity, `100 · (1 − indel_distance / (|a| + |b|))`
/// rounded, via [`rapidfuzz::fuzz::ratio`].  Equivalent to
/// `100 · 2·LCS / (|a| + |b|)` over characters.
#[derive(Copy, Clone, Debug, Default)]
pub struct IndelRatio;

impl Similarity for IndelRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        if a.is_empty() && b.is_empty() {
            return 100;
        }
        let ratio = fuzz::ratio(a.chars(), b.chars());
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Normalize a free-text query and cut it to [`MAX_QUERY_CHARS`].
pub(crate) fn normalize_query(raw: &str) -> String {
    let mut q = normalize_name(raw);
    if let Some((cut, _)) = q.char_indices().nth(MAX_QUERY_CHARS) {
        q.truncate(cut);
        let kept = q.trim_end().len();
        q.truncate(kept);
    }
    q
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Best candidate for a query.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    /// Candidate exactly as supplied by the caller.
    pub matched_name: String,
    /// Position of the candidate in the supplied list.
    pub candidate_index: usize,
    pub score: u8,
}

impl MatchResult {
    /// The candidate position as a `RegionId`, for candidates taken from
    /// [`crate::RegionIndex::names`].
    pub fn region_id(&self) -> RegionId {
        RegionId(self.candidate_index as u32)
    }
}

/// Query did not resolve at or above the threshold.  Carries the best
/// candidate seen, if any, so callers can report how close the query was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoMatch {
    pub best: Option<MatchResult>,
}

impl NoMatch {
    pub fn best_score(&self) -> u8 {
        self.best.as_ref().map_or(0, |m| m.score)
    }
}

// ── FuzzyResolver ─────────────────────────────────────────────────────────────

/// Resolves free text to one of a list of candidate names.
#[derive(Clone, Debug, Default)]
pub struct FuzzyResolver<S = IndelRatio> {
    similarity: S,
}

impl FuzzyResolver<IndelRatio> {
    pub fn new() -> Self {
        Self { similarity: IndelRatio }
    }
}

impl<S: Similarity> FuzzyResolver<S> {
    /// Use a different similarity metric under the same scoring contract.
    pub fn with_similarity(similarity: S) -> Self {
        Self { similarity }
    }

    /// Score one candidate against a query under the scoring contract.
    /// `None` for an empty query.
    pub fn score(&self, query: &str, candidate: &str) -> Option<u8> {
        let q = normalize_query(query);
        if q.is_empty() {
            return None;
        }
        Some(self.score_normalized(&q, &normalize_name(candidate)))
    }

    fn score_normalized(&self, q: &str, c: &str) -> u8 {
        if q == c {
            return 100;
        }
        let metric = self.similarity.score(q, c).min(99);
        if !c.is_empty() && (c.contains(q) || q.contains(c)) {
            metric.max(CONTAINMENT_SCORE)
        } else {
            metric
        }
    }

    /// Highest-scoring candidate regardless of threshold.  `None` for an
    /// empty query or an empty candidate list.
    pub fn best_match<I, T>(&self, query: &str, candidates: I) -> Option<MatchResult>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let q = normalize_query(query);
        if q.is_empty() {
            return None;
        }

        let mut best: Option<MatchResult> = None;
        for (i, cand) in candidates.into_iter().enumerate() {
            let cand = cand.as_ref();
            let score = self.score_normalized(&q, &normalize_name(cand));
            // Strict `>` keeps the earliest candidate on equal scores.
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(MatchResult {
                    matched_name: cand.to_string(),
                    candidate_index: i,
                    score,
                });
            }
            if score == 100 {
                break;
            }
        }
        best
    }

    /// Resolve `query`, accepting the best candidate only if its score is at
    /// least `threshold`.
    pub fn resolve<I, T>(&self, query: &str, candidates: I, threshold: u8) -> Result<MatchResult, NoMatch>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        match self.best_match(query, candidates) {
            Some(m) if m.score >= threshold => Ok(m),
            best => Err(NoMatch { best }),
        }
    }
}
