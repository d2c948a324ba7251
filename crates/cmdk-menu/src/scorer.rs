#![forbid(unsafe_code)]

//! Match scoring for menu items.
//!
//! The engine treats scoring as a pluggable leaf: anything implementing
//! [`ScoreFn`] maps `(value, query, keywords)` to a relevance in `[0, 1]`,
//! where `0` hides the item. Plain closures with that signature qualify.
//!
//! The default implementation is [`BayesianScorer`], a probabilistic model
//! that combines match-type priors with Bayes factors:
//!
//! ```text
//! P(relevant | evidence) / P(not_relevant | evidence)
//!     = [P(relevant) / P(not_relevant)] × Π_i BF_i
//! ```
//!
//! Prior odds by match type:
//! - Exact match: 99:1
//! - Prefix match: 9:1
//! - Word-start match: 4:1
//! - Substring match: 2:1
//! - Fuzzy match: 1:3
//!
//! The final score is the posterior probability. An optional
//! [`EvidenceLedger`] records every factor so rankings can be explained.
//!
//! # Keywords
//!
//! Keywords are aliases. When the value itself matches and the query also
//! appears in a keyword, the keyword acts as supporting evidence (BF 3.0).
//! When only a keyword matches, the best keyword match is used with a
//! discount (BF 0.5) so direct value matches rank first.
//!
//! # Invariants
//!
//! 1. Scores are bounded: 0.0 ≤ score ≤ 1.0
//! 2. Determinism: same input → identical score
//! 3. Case-insensitive: query and value are compared lowercased

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use unicode_segmentation::UnicodeSegmentation;

/// Bytes that start a new word in ASCII values.
const WORD_SEPARATORS: &[u8] = b" -_./:";

/// Bayes factor applied when the query also appears in a keyword.
const KEYWORD_SUPPORT_FACTOR: f64 = 3.0;

/// Bayes factor applied when only a keyword matched.
const KEYWORD_ONLY_FACTOR: f64 = 0.5;

// ---------------------------------------------------------------------------
// Scoring seam
// ---------------------------------------------------------------------------

/// A scoring function: `(value, query, keywords) → [0, 1]`.
///
/// Implementations must be pure. The engine never calls `score` with an
/// empty `value`; such items score `0` without consulting the function.
pub trait ScoreFn {
    /// Score `value` (and its `keywords`) against `query`.
    fn score(&self, value: &str, query: &str, keywords: &[String]) -> f64;
}

impl<F> ScoreFn for F
where
    F: Fn(&str, &str, &[String]) -> f64,
{
    fn score(&self, value: &str, query: &str, keywords: &[String]) -> f64 {
        self(value, query, keywords)
    }
}

impl ScoreFn for BayesianScorer {
    fn score(&self, value: &str, query: &str, keywords: &[String]) -> f64 {
        self.score_with_keywords(query, value, keywords).score
    }
}

/// Shared counter of scoring calls, read from outside the menu.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicU64>);

impl CallCounter {
    /// Number of calls observed so far.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Reset the count to zero.
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

/// Wraps a scorer and counts how often it is invoked.
#[derive(Debug, Clone)]
pub struct CountingScorer<S> {
    inner: S,
    calls: CallCounter,
}

impl<S: ScoreFn> CountingScorer<S> {
    /// Wrap `inner`, returning the scorer and a handle to its call count.
    pub fn new(inner: S) -> (Self, CallCounter) {
        let calls = CallCounter::default();
        (
            Self {
                inner,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl<S: ScoreFn> ScoreFn for CountingScorer<S> {
    fn score(&self, value: &str, query: &str, keywords: &[String]) -> f64 {
        self.calls.bump();
        self.inner.score(value, query, keywords)
    }
}

// ---------------------------------------------------------------------------
// Match kinds
// ---------------------------------------------------------------------------

/// How a query matched a value, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchType {
    NoMatch,
    /// Every query character appears in order, with gaps.
    Fuzzy,
    /// The query appears contiguously.
    Substring,
    /// Every query character starts a word.
    WordStart,
    Prefix,
    Exact,
}

impl MatchType {
    /// Odds that a match of this kind is the item the user wants.
    pub fn prior_odds(self) -> f64 {
        match self {
            Self::Exact => 99.0,
            Self::Prefix => 9.0,
            Self::WordStart => 4.0,
            Self::Substring => 2.0,
            Self::Fuzzy => 0.333,
            Self::NoMatch => 0.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::WordStart => "word starts",
            Self::Substring => "substring",
            Self::Fuzzy => "fuzzy",
            Self::NoMatch => "none",
        }
    }
}

// ---------------------------------------------------------------------------
// Explanations
// ---------------------------------------------------------------------------

/// What a factor in the ledger measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceKind {
    /// The prior from [`MatchType`].
    MatchType,
    WordBoundary,
    /// Earlier first matches score higher.
    Position,
    GapPenalty,
    /// The value matched and a keyword contains the query too.
    KeywordSupport,
    /// Only a keyword matched.
    KeywordOnly,
    /// Fraction of the value the query covers.
    Coverage,
}

/// One factor behind a score.
#[derive(Debug, Clone)]
pub struct EvidenceEntry {
    pub kind: EvidenceKind,
    /// Above 1 raises the odds, below 1 lowers them.
    pub bayes_factor: f64,
    pub detail: String,
}

impl fmt::Display for EvidenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} x{:.2}: {}", self.kind, self.bayes_factor, self.detail)
    }
}

/// Every factor behind a score, in the order applied.
#[derive(Debug, Clone, Default)]
pub struct EvidenceLedger {
    entries: Vec<EvidenceEntry>,
}

impl EvidenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: EvidenceKind, bayes_factor: f64, detail: impl Into<String>) {
        self.entries.push(EvidenceEntry {
            kind,
            bayes_factor,
            detail: detail.into(),
        });
    }

    pub fn entries(&self) -> &[EvidenceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The prior recorded by the [`EvidenceKind::MatchType`] entry.
    pub fn prior_odds(&self) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.kind == EvidenceKind::MatchType)
            .map(|e| e.bayes_factor)
    }

    /// `odds / (1 + odds)`, where the odds are the prior times every other
    /// factor.
    pub fn posterior_probability(&self) -> f64 {
        let odds = self
            .entries
            .iter()
            .filter(|e| e.kind != EvidenceKind::MatchType)
            .fold(self.prior_odds().unwrap_or(1.0), |odds, e| odds * e.bayes_factor);
        odds_to_probability(odds)
    }
}

impl fmt::Display for EvidenceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        write!(f, "posterior {:.3}", self.posterior_probability())
    }
}

fn odds_to_probability(odds: f64) -> f64 {
    if odds.is_infinite() {
        1.0
    } else {
        odds / (1.0 + odds)
    }
}

/// Multiply the odds behind `probability` by `factor`.
fn scale_odds(probability: f64, factor: f64) -> f64 {
    if probability >= 1.0 {
        return if factor >= 1.0 { 1.0 } else { odds_to_probability(99.0 * factor) };
    }
    if probability <= 0.0 {
        return 0.0;
    }
    odds_to_probability(probability / (1.0 - probability) * factor)
}

// ---------------------------------------------------------------------------
// Match Result
// ---------------------------------------------------------------------------

/// A scored match.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Posterior probability in `[0, 1]`.
    pub score: f64,
    pub match_type: MatchType,
    /// Char indices in the value that matched; empty for keyword matches.
    pub match_positions: Vec<usize>,
    /// Empty unless the scorer was built with [`BayesianScorer::explained`].
    pub evidence: EvidenceLedger,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self {
            score: 0.0,
            match_type: MatchType::NoMatch,
            match_positions: Vec::new(),
            evidence: EvidenceLedger::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.match_type != MatchType::NoMatch && self.score > 0.0
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Bayesian fuzzy matcher, the default [`ScoreFn`].
#[derive(Debug, Clone, Default)]
pub struct BayesianScorer {
    /// Whether to record an evidence ledger (slower but explainable).
    pub track_evidence: bool,
}

impl BayesianScorer {
    /// Scorer without evidence tracking.
    pub fn new() -> Self {
        Self {
            track_evidence: false,
        }
    }

    /// Scorer that records an evidence ledger with every result.
    pub fn explained() -> Self {
        Self {
            track_evidence: true,
        }
    }

    /// Score `query` against a single `value`.
    pub fn score(&self, query: &str, value: &str) -> MatchResult {
        if query.is_empty() {
            return self.neutral(value);
        }

        let query_lower = query.to_lowercase();
        let value_lower = value.to_lowercase();
        let (match_type, positions) = detect_match(&query_lower, &value_lower);
        if match_type == MatchType::NoMatch {
            return MatchResult::no_match();
        }

        self.compute_score(match_type, positions, &query_lower, &value_lower)
    }

    /// Score `query` against `value` and its keyword aliases.
    pub fn score_with_keywords<K: AsRef<str>>(
        &self,
        query: &str,
        value: &str,
        keywords: &[K],
    ) -> MatchResult {
        let mut result = self.score(query, value);
        if query.is_empty() || keywords.is_empty() {
            return result;
        }

        if result.is_match() {
            let query_lower = query.to_lowercase();
            let supporting = keywords
                .iter()
                .find(|k| k.as_ref().to_lowercase().contains(&query_lower));
            if let Some(keyword) = supporting {
                self.apply_factor(
                    &mut result,
                    EvidenceKind::KeywordSupport,
                    KEYWORD_SUPPORT_FACTOR,
                    keyword.as_ref(),
                );
            }
            return result;
        }

        // Value missed: fall back to the best keyword, discounted.
        let best = keywords
            .iter()
            .filter(|k| !k.as_ref().is_empty())
            .map(|k| (k.as_ref(), self.score(query, k.as_ref())))
            .filter(|(_, r)| r.is_match())
            .max_by(|a, b| a.1.score.total_cmp(&b.1.score));

        match best {
            Some((keyword, mut kw)) => {
                kw.match_positions.clear();
                self.apply_factor(&mut kw, EvidenceKind::KeywordOnly, KEYWORD_ONLY_FACTOR, keyword);
                kw
            }
            None => result,
        }
    }

    fn apply_factor(&self, result: &mut MatchResult, kind: EvidenceKind, factor: f64, kw: &str) {
        if self.track_evidence {
            result.evidence.add(kind, factor, format!("keyword {kw:?}"));
            result.score = result.evidence.posterior_probability();
        } else {
            result.score = scale_odds(result.score, factor);
        }
    }

    /// Score for an empty query: every value matches with a neutral score.
    fn neutral(&self, value: &str) -> MatchResult {
        let mut evidence = EvidenceLedger::new();
        if self.track_evidence {
            evidence.add(EvidenceKind::MatchType, 1.0, "empty query");
        }
        MatchResult {
            score: 0.5,
            match_type: if value.is_empty() {
                MatchType::NoMatch
            } else {
                MatchType::Fuzzy
            },
            match_positions: Vec::new(),
            evidence,
        }
    }

    fn compute_score(
        &self,
        match_type: MatchType,
        positions: Vec<usize>,
        query_lower: &str,
        value_lower: &str,
    ) -> MatchResult {
        let features = Features::measure(match_type, &positions, query_lower, value_lower);
        let factors = features.factors();

        let mut evidence = EvidenceLedger::new();
        let score = if self.track_evidence {
            for &(kind, bf) in &factors {
                evidence.add(kind, bf, features.describe(kind));
            }
            evidence.posterior_probability()
        } else {
            odds_to_probability(factors.iter().map(|(_, bf)| bf).product())
        };

        MatchResult {
            score,
            match_type,
            match_positions: positions,
            evidence,
        }
    }
}

/// What the Bayes factors are computed from.
struct Features {
    match_type: MatchType,
    first: Option<usize>,
    boundaries: usize,
    /// Only measured for fuzzy matches.
    gap: Option<usize>,
    coverage: f64,
}

impl Features {
    fn measure(match_type: MatchType, positions: &[usize], query: &str, value: &str) -> Self {
        let value_len = value.chars().count().max(1);
        Self {
            match_type,
            first: positions.first().copied(),
            boundaries: count_word_boundaries(positions, value),
            gap: (match_type == MatchType::Fuzzy && positions.len() > 1)
                .then(|| total_gap(positions)),
            coverage: query.chars().count() as f64 / value_len as f64,
        }
    }

    /// The prior first, then each factor that applies.
    fn factors(&self) -> Vec<(EvidenceKind, f64)> {
        let mut factors = Vec::with_capacity(5);
        factors.push((EvidenceKind::MatchType, self.match_type.prior_odds()));
        if let Some(first) = self.first {
            factors.push((EvidenceKind::Position, 1.0 + 0.5 / (first as f64 + 1.0)));
        }
        if self.boundaries > 0 {
            factors.push((EvidenceKind::WordBoundary, 1.0 + self.boundaries as f64 * 0.3));
        }
        if let Some(gap) = self.gap {
            factors.push((EvidenceKind::GapPenalty, 1.0 / (1.0 + gap as f64 * 0.1)));
        }
        factors.push((EvidenceKind::Coverage, 1.0 + self.coverage * 0.2));
        factors
    }

    fn describe(&self, kind: EvidenceKind) -> String {
        match kind {
            EvidenceKind::MatchType => format!("{} match", self.match_type.label()),
            EvidenceKind::Position => format!("first match at {}", self.first.unwrap_or(0)),
            EvidenceKind::WordBoundary => format!("{} at word starts", self.boundaries),
            EvidenceKind::GapPenalty => format!("{} skipped chars", self.gap.unwrap_or(0)),
            EvidenceKind::Coverage => format!("covers {:.0}%", self.coverage * 100.0),
            EvidenceKind::KeywordSupport | EvidenceKind::KeywordOnly => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Match detection
// ---------------------------------------------------------------------------

/// Detect the match type and matched character positions.
///
/// Both inputs must already be lowercased.
fn detect_match(query: &str, value: &str) -> (MatchType, Vec<usize>) {
    if query.is_ascii() && value.is_ascii() {
        return detect_match_ascii(query.as_bytes(), value.as_bytes());
    }
    detect_match_unicode(query, value)
}

fn detect_match_ascii(query: &[u8], value: &[u8]) -> (MatchType, Vec<usize>) {
    if query.len() > value.len() {
        return (MatchType::NoMatch, Vec::new());
    }
    if query == value {
        return (MatchType::Exact, (0..value.len()).collect());
    }
    if value.starts_with(query) {
        return (MatchType::Prefix, (0..query.len()).collect());
    }

    let starts: Vec<usize> = (0..value.len())
        .filter(|&i| i == 0 || WORD_SEPARATORS.contains(&value[i - 1]))
        .collect();
    if let Some(positions) = subsequence_at(query, value, &starts) {
        return (MatchType::WordStart, positions);
    }

    if let Some(start) = value.windows(query.len()).position(|w| w == query) {
        return (MatchType::Substring, (start..start + query.len()).collect());
    }

    let all: Vec<usize> = (0..value.len()).collect();
    if let Some(positions) = subsequence_at(query, value, &all) {
        return (MatchType::Fuzzy, positions);
    }

    (MatchType::NoMatch, Vec::new())
}

fn detect_match_unicode(query: &str, value: &str) -> (MatchType, Vec<usize>) {
    let q: Vec<char> = query.chars().collect();
    let v: Vec<char> = value.chars().collect();
    if q.len() > v.len() {
        return (MatchType::NoMatch, Vec::new());
    }
    if q == v {
        return (MatchType::Exact, (0..v.len()).collect());
    }
    if v.starts_with(&q) {
        return (MatchType::Prefix, (0..q.len()).collect());
    }

    if let Some(positions) = subsequence_at(&q, &v, &unicode_word_starts(value)) {
        return (MatchType::WordStart, positions);
    }

    if let Some(start) = v.windows(q.len()).position(|w| w == q.as_slice()) {
        return (MatchType::Substring, (start..start + q.len()).collect());
    }

    let all: Vec<usize> = (0..v.len()).collect();
    if let Some(positions) = subsequence_at(&q, &v, &all) {
        return (MatchType::Fuzzy, positions);
    }

    (MatchType::NoMatch, Vec::new())
}

/// Match `query` in order against `value`, only at the given candidate indices.
fn subsequence_at<T: PartialEq>(
    query: &[T],
    value: &[T],
    candidates: &[usize],
) -> Option<Vec<usize>> {
    if query.is_empty() {
        return Some(Vec::new());
    }
    let mut positions = Vec::with_capacity(query.len());
    let mut qi = 0;
    for &pos in candidates {
        if value.get(pos) == Some(&query[qi]) {
            positions.push(pos);
            qi += 1;
            if qi == query.len() {
                return Some(positions);
            }
        }
    }
    None
}

/// Char indices where a Unicode word (per UAX #29) begins.
fn unicode_word_starts(value: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut char_idx = 0;
    let mut byte_cursor = 0;
    for (byte_idx, segment) in value.split_word_bound_indices() {
        char_idx += value[byte_cursor..byte_idx].chars().count();
        byte_cursor = byte_idx;
        if segment.chars().next().is_some_and(char::is_alphanumeric) {
            starts.push(char_idx);
        }
    }
    starts
}

/// Count matched positions that sit at a word boundary.
fn count_word_boundaries(positions: &[usize], value_lower: &str) -> usize {
    if value_lower.is_ascii() {
        let bytes = value_lower.as_bytes();
        positions
            .iter()
            .filter(|&&pos| {
                pos == 0 || bytes.get(pos - 1).is_some_and(|b| WORD_SEPARATORS.contains(b))
            })
            .count()
    } else {
        let starts = unicode_word_starts(value_lower);
        positions.iter().filter(|pos| starts.contains(pos)).count()
    }
}

/// Total number of unmatched characters between matched positions.
fn total_gap(positions: &[usize]) -> usize {
    positions
        .windows(2)
        .map(|w| w[1].saturating_sub(w[0]).saturating_sub(1))
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
