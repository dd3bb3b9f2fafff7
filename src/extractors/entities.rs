//! Regex entity recognition over band text.
//!
//! A fixed battery of recognizers finds identifiers and values common in
//! Brazilian court filings:
//!
//! | Label         | Matches                                             |
//! |---------------|-----------------------------------------------------|
//! | `CPF`         | 11-digit taxpayer id, optionally `###.###.###-##`    |
//! | `CNPJ`        | 14-digit business id, optionally `##.###.###/####-##`|
//! | `CNJ`         | unified case number with 20 digits                  |
//! | `CNJ_PARTIAL` | truncated case number (`NNNNNNN-DD[.AAAA...]`)       |
//! | `MONEY`       | decimal-comma amount, optional `R$` prefix          |
//! | `DATE`        | `dd/mm/yyyy` or `12 de março de 2024`               |
//! | `EMAIL`       | e-mail address                                      |
//!
//! Numeric recognizers (`CPF`, `CNPJ`, `CNJ`, `MONEY`) only accept a match
//! that is not directly preceded or followed by a digit, so a slice of a
//! longer number is never reported. Letters may touch the match
//! (`nº0001234-56...`).
//!
//! Matches of every recognizer are merged and overlaps resolved leftmost
//! first, longest first on equal starts.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref RE_CPF: Regex = Regex::new(r"[0-9]{3}\.?[0-9]{3}\.?[0-9]{3}-?[0-9]{2}").unwrap();
    static ref RE_CNPJ: Regex = Regex::new(r"[0-9]{2}\.?[0-9]{3}\.?[0-9]{3}/?[0-9]{4}-?[0-9]{2}").unwrap();
    static ref RE_CNJ: Regex = Regex::new(
        r"[0-9]{7}-?[0-9]{2}\.?[0-9]{4}\.?[0-9]\.?[0-9]{2}\.?[0-9]{4}|[0-9]{7}-[0-9]{2}(?:\.[0-9]{4}(?:\.[0-9](?:\.[0-9]{2})?)?)?"
    )
    .unwrap();
    static ref RE_MONEY: Regex =
        Regex::new(r"(?:R\$\s*)?(?:[0-9]{1,3}(?:\.[0-9]{3})+|[0-9]+),[0-9]{2}\b").unwrap();
    static ref RE_DATE: Regex = Regex::new(
        r"(?i)\b(?:[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}|[0-9]{1,2}\s+de\s+(?:janeiro|fevereiro|mar[çc]o|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)\s+de\s+[0-9]{4})\b"
    )
    .unwrap();
    static ref RE_EMAIL: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
}

/// Digits a full CNJ number carries.
const CNJ_DIGITS: usize = 20;

/// A labeled character span of the annotated text.
///
/// `start` and `end` are half-open character (not byte) offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// Recognizer label
    pub label: String,
    /// First character
    pub start: usize,
    /// One past the last character
    pub end: usize,
    /// Matched text
    pub text: String,
}

impl Entity {
    /// Span length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for a zero-width span.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone)]
enum Labeler {
    Fixed(String),
    CaseNumber,
}

impl Labeler {
    fn label(&self, matched: &str) -> String {
        match self {
            Labeler::Fixed(label) => label.clone(),
            Labeler::CaseNumber => {
                let digits = matched.chars().filter(char::is_ascii_digit).count();
                let label = if digits >= CNJ_DIGITS { "CNJ" } else { "CNJ_PARTIAL" };
                label.to_string()
            },
        }
    }
}

#[derive(Debug, Clone)]
struct Recognizer {
    regex: Regex,
    labeler: Labeler,
    /// Reject matches touching a digit on either side
    digit_bounded: bool,
}

/// Applies the recognizer battery to normalized text.
#[derive(Debug, Clone)]
pub struct EntityAnnotator {
    recognizers: Vec<Recognizer>,
}

impl Default for EntityAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityAnnotator {
    /// Create an annotator with the built-in recognizers.
    pub fn new() -> Self {
        let fixed = |regex: Regex, label: &str, digit_bounded: bool| Recognizer {
            regex,
            labeler: Labeler::Fixed(label.to_string()),
            digit_bounded,
        };
        Self {
            recognizers: vec![
                fixed(RE_CPF.clone(), "CPF", true),
                fixed(RE_CNPJ.clone(), "CNPJ", true),
                Recognizer {
                    regex: RE_CNJ.clone(),
                    labeler: Labeler::CaseNumber,
                    digit_bounded: true,
                },
                fixed(RE_MONEY.clone(), "MONEY", true),
                fixed(RE_DATE.clone(), "DATE", false),
                fixed(RE_EMAIL.clone(), "EMAIL", false),
            ],
        }
    }

    /// Add a recognizer after the built-in ones.
    pub fn with_recognizer(mut self, label: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.recognizers.push(Recognizer {
            regex,
            labeler: Labeler::Fixed(label.to_string()),
            digit_bounded: false,
        });
        Ok(self)
    }

    /// Every match of every recognizer, overlaps included, in recognizer order.
    pub fn candidates(&self, text: &str) -> Vec<Entity> {
        let offsets = CharOffsets::new(text);
        let mut found = Vec::new();
        for recognizer in &self.recognizers {
            for m in recognizer.regex.find_iter(text) {
                if m.as_str().is_empty() || (recognizer.digit_bounded && touches_digit(text, m.start(), m.end())) {
                    continue;
                }
                found.push(Entity {
                    label: recognizer.labeler.label(m.as_str()),
                    start: offsets.char_at(m.start()),
                    end: offsets.char_at(m.end()),
                    text: m.as_str().to_string(),
                });
            }
        }
        found
    }

    /// Non-overlapping entities of `text`, ordered by start.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_template_diff::extractors::EntityAnnotator;
    ///
    /// let entities = EntityAnnotator::new().annotate("Valor: R$ 1.234,56 em 02/05/2024");
    /// let labels: Vec<&str> = entities.iter().map(|e| e.label.as_str()).collect();
    /// assert_eq!(labels, vec!["MONEY", "DATE"]);
    /// assert_eq!(entities[0].text, "R$ 1.234,56");
    /// ```
    pub fn annotate(&self, text: &str) -> Vec<Entity> {
        resolve_overlaps(self.candidates(text))
    }
}

/// Keep a non-overlapping subset of `candidates`.
///
/// Candidates are ordered by start, longer first on equal starts (stable for
/// equal spans, so earlier recognizers win exact ties), then accepted
/// greedily when they start at or after the end of the last accepted one.
pub fn resolve_overlaps(mut candidates: Vec<Entity>) -> Vec<Entity> {
    candidates.sort_by(|x, y| x.start.cmp(&y.start).then(y.len().cmp(&x.len())));

    let mut accepted: Vec<Entity> = Vec::with_capacity(candidates.len());
    let mut last_end = 0usize;
    for entity in candidates {
        if entity.start >= last_end {
            last_end = entity.end;
            accepted.push(entity);
        }
    }
    accepted
}

/// True when the byte span `start..end` of `text` has an ASCII digit right
/// before or right after it.
fn touches_digit(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    [before, after].iter().flatten().any(char::is_ascii_digit)
}

/// Byte offset to character offset lookup.
struct CharOffsets {
    boundaries: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        boundaries.push(text.len());
        Self { boundaries }
    }

    fn char_at(&self, byte: usize) -> usize {
        self.boundaries.partition_point(|&b| b < byte)
    }
}
