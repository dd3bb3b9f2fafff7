//! Front/back alignment of two invocation sequences.
//!
//! The engine walks both sequences from the start (and, independently, from
//! the end) while invocations stay equivalent. When they diverge it looks up
//! to `backoff` invocations ahead on either side for a point where the two
//! walks line up again, skips there and keeps walking. The walk stops for
//! good when no such point exists, when either sequence runs out, or when the
//! scan deadline passes.
//!
//! The matched prefix is the *front head*, the matched suffix the *back
//! tail*. Whatever lies between is document-specific content.

use crate::config::{AlignConfig, MatchMode};
use crate::content::operators::Invocation;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Deadline checks happen once per this many walk steps.
const DEADLINE_CHECK_INTERVAL: usize = 64;

/// One aligned operator range of one document.
///
/// `start_op` and `end_op` are 1-based and inclusive. An unresolved range is
/// `0/0` with empty text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AlignRangeValue {
    /// First invocation of the range (0 = unresolved)
    pub start_op: usize,
    /// Last invocation of the range (0 = unresolved)
    pub end_op: usize,
    /// Decoded text of every invocation in the range, concatenated
    pub value_full: String,
}

impl AlignRangeValue {
    /// The `0/0` sentinel.
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Build the range `start..=end` (1-based) over `invocations`.
    ///
    /// Empty or out-of-bounds ranges yield the sentinel.
    pub fn from_range(invocations: &[Invocation], start: usize, end: usize) -> Self {
        if start == 0 || end < start || end > invocations.len() {
            return Self::unresolved();
        }
        let value_full = invocations[start - 1..end].iter().map(Invocation::text).collect();
        Self {
            start_op: start,
            end_op: end,
            value_full,
        }
    }

    /// Decoded text of each invocation in the range, in order.
    ///
    /// Empty for the sentinel, or when the range does not fit `invocations`.
    pub fn texts<'a>(&self, invocations: &'a [Invocation]) -> Vec<&'a str> {
        if !self.is_resolved() || self.end_op > invocations.len() {
            return Vec::new();
        }
        invocations[self.start_op - 1..self.end_op]
            .iter()
            .map(Invocation::text)
            .collect()
    }

    /// True unless this is the sentinel.
    pub fn is_resolved(&self) -> bool {
        self.start_op > 0
    }

    /// Number of invocations covered.
    pub fn len(&self) -> usize {
        if self.is_resolved() {
            self.end_op + 1 - self.start_op
        } else {
            0
        }
    }

    /// True for the sentinel.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `op<start>`, `op<start>-<end>` or `op0`.
    pub fn op_label(&self) -> String {
        match (self.start_op, self.end_op) {
            (0, _) => "op0".to_string(),
            (s, e) if s == e => format!("op{}", s),
            (s, e) => format!("op{}-{}", s, e),
        }
    }
}

/// Front and back ranges of both documents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AlignRangeResult {
    /// Shared prefix in document A
    pub front_a: AlignRangeValue,
    /// Shared prefix in document B
    pub front_b: AlignRangeValue,
    /// Shared suffix in document A
    pub back_a: AlignRangeValue,
    /// Shared suffix in document B
    pub back_b: AlignRangeValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    A(usize),
    B(usize),
}

/// Walk outcome: invocations consumed on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Walk {
    a: usize,
    b: usize,
}

/// Computes front-head and back-tail ranges.
#[derive(Debug, Clone)]
pub struct AlignmentEngine {
    backoff: usize,
    match_mode: MatchMode,
    scan_deadline: Option<Duration>,
}

impl Default for AlignmentEngine {
    fn default() -> Self {
        Self::new(&AlignConfig::default())
    }
}

impl AlignmentEngine {
    /// Create an engine from the alignment settings.
    pub fn new(config: &AlignConfig) -> Self {
        Self {
            backoff: config.backoff,
            match_mode: config.match_mode,
            scan_deadline: config.scan_deadline,
        }
    }

    /// Align two already filtered invocation sequences.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_template_diff::align::AlignmentEngine;
    /// use pdf_template_diff::config::ExtractorConfig;
    /// use pdf_template_diff::content::{OperatorExtractor, SimpleTextDecoder};
    ///
    /// let extract = |data: &[u8]| {
    ///     let decoded = SimpleTextDecoder::new().decode(data);
    ///     OperatorExtractor::new(ExtractorConfig::new()).extract(data, &decoded)
    /// };
    /// let a = extract(b"(Head) Tj (x) Tj (Tail) Tj");
    /// let b = extract(b"(Head) Tj (y) Tj (Tail) Tj");
    ///
    /// let result = AlignmentEngine::default().align(&a, &b);
    /// assert_eq!(result.front_a.op_label(), "op1");
    /// assert_eq!(result.back_b.op_label(), "op3");
    /// ```
    pub fn align(&self, a: &[Invocation], b: &[Invocation]) -> AlignRangeResult {
        let started = Instant::now();

        let forward_a: Vec<&Invocation> = a.iter().collect();
        let forward_b: Vec<&Invocation> = b.iter().collect();
        let front = self.walk(&forward_a, &forward_b, started, "front");

        let reverse_a: Vec<&Invocation> = a.iter().rev().collect();
        let reverse_b: Vec<&Invocation> = b.iter().rev().collect();
        let back = self.walk(&reverse_a, &reverse_b, started, "back");

        log::debug!(
            "Aligned {}/{} invocations: front {}/{}, back {}/{}",
            a.len(),
            b.len(),
            front.a,
            front.b,
            back.a,
            back.b
        );

        AlignRangeResult {
            front_a: AlignRangeValue::from_range(a, 1, front.a),
            front_b: AlignRangeValue::from_range(b, 1, front.b),
            back_a: AlignRangeValue::from_range(a, a.len() + 1 - back.a, a.len()),
            back_b: AlignRangeValue::from_range(b, b.len() + 1 - back.b, b.len()),
        }
    }

    /// True if two invocations count as the same template element.
    pub fn equivalent(&self, x: &Invocation, y: &Invocation) -> bool {
        if x.operator != y.operator {
            return false;
        }
        match self.match_mode {
            MatchMode::Shape => true,
            MatchMode::Operands => {
                x.operands.len() == y.operands.len()
                    && x.operands.iter().zip(&y.operands).all(|(p, q)| p.text == q.text)
            },
        }
    }

    fn walk(&self, a: &[&Invocation], b: &[&Invocation], started: Instant, label: &str) -> Walk {
        let (mut i, mut j) = (0usize, 0usize);
        let mut steps = 0usize;

        while i < a.len() && j < b.len() {
            steps += 1;
            if steps % DEADLINE_CHECK_INTERVAL == 1 && self.deadline_passed(started) {
                log::warn!(
                    "Scan deadline reached during {} walk after {} steps; stopping at {}/{}",
                    label,
                    steps,
                    i,
                    j
                );
                break;
            }

            if self.equivalent(a[i], b[j]) {
                i += 1;
                j += 1;
                continue;
            }

            match self.resync(a, b, i, j) {
                Some(Skip::A(k)) => {
                    log::debug!("{} walk: skipping {} invocation(s) of A at {}", label, k, i + 1);
                    i += k;
                },
                Some(Skip::B(k)) => {
                    log::debug!("{} walk: skipping {} invocation(s) of B at {}", label, k, j + 1);
                    j += k;
                },
                None => break,
            }
        }

        Walk { a: i, b: j }
    }

    /// Smallest skip that lines both walks up again.
    ///
    /// The skipped-to pair must match, and so must the pair after it when
    /// both sequences have one. Skipping in A wins a tie.
    fn resync(&self, a: &[&Invocation], b: &[&Invocation], i: usize, j: usize) -> Option<Skip> {
        let confirmed = |x: usize, y: usize| -> bool {
            x < a.len()
                && y < b.len()
                && self.equivalent(a[x], b[y])
                && (x + 1 >= a.len() || y + 1 >= b.len() || self.equivalent(a[x + 1], b[y + 1]))
        };

        (1..=self.backoff).find_map(|k| {
            if confirmed(i + k, j) {
                Some(Skip::A(k))
            } else if confirmed(i, j + k) {
                Some(Skip::B(k))
            } else {
                None
            }
        })
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        self.scan_deadline.map_or(false, |limit| started.elapsed() >= limit)
    }
}
