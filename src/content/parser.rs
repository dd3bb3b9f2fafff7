//! Operator extraction.
//!
//! Content streams use postfix notation: operands precede their operator.
//!
//! ```text
//! BT
//!   /F1 12 Tf
//!   100 700 Td
//!   [(Val) 20 (or)] TJ
//! ET
//! ```
//!
//! Extraction runs in three pure steps:
//!
//! 1. [`group_invocations`] folds the token stream into `(operands, operator)`
//!    units.
//! 2. [`pair_decoded_text`] merges those units with the decoder's text chunks
//!    using two explicit cursors. A `TJ` consumes one chunk per string element
//!    of its array; `Tj`, `'` and `"` consume exactly one.
//! 3. [`apply_filters`] applies the operator allow-list and the minimum text
//!    length, then renumbers the survivors from 1.

use crate::config::{ExtractorConfig, LengthFilterPolicy};
use crate::content::operators::{is_operator, is_text_showing, rendered_string_count, Invocation};
use crate::lexer::{tokenize, Token};

/// An invocation before text pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInvocation {
    /// Operand tokens in stream order
    pub operands: Vec<Token>,
    /// Operator name
    pub operator: String,
}

/// Fold a token sequence into operator invocations.
///
/// Tokens that are not operator names accumulate as pending operands and are
/// attached to the next operator. Operands left over at the end of the stream
/// have no operator and are dropped.
pub fn group_invocations(tokens: Vec<Token>) -> Vec<RawInvocation> {
    let mut invocations = Vec::new();
    let mut pending: Vec<Token> = Vec::new();

    for token in tokens {
        if token.is_bare() && is_operator(&token.text) {
            invocations.push(RawInvocation {
                operands: std::mem::take(&mut pending),
                operator: token.text,
            });
        } else {
            pending.push(token);
        }
    }

    if !pending.is_empty() {
        log::debug!("Dropping {} trailing operands without an operator", pending.len());
    }

    invocations
}

/// Merge invocations with the decoded text chunks of the same stream.
///
/// Both sequences are read front to back with independent cursors. A
/// text-showing invocation takes as many chunks as it renders strings and
/// concatenates them; when the chunks run out it receives what is left
/// (possibly nothing). Non-text invocations carry no text.
pub fn pair_decoded_text(raw: Vec<RawInvocation>, decoded: &[String]) -> Vec<Invocation> {
    let mut cursor = 0usize;
    let mut paired = Vec::with_capacity(raw.len());

    for (i, inv) in raw.into_iter().enumerate() {
        let text = if is_text_showing(&inv.operator) {
            let wanted = rendered_string_count(&inv.operator, &inv.operands);
            let end = (cursor + wanted).min(decoded.len());
            if end - cursor < wanted {
                log::debug!(
                    "Decoded text exhausted at invocation {} ({} wanted, {} left)",
                    i + 1,
                    wanted,
                    end - cursor
                );
            }
            let text = decoded[cursor..end].concat();
            cursor = end;
            Some(text)
        } else {
            None
        };

        paired.push(Invocation {
            index: i + 1,
            raw_index: i + 1,
            operands: inv.operands,
            operator: inv.operator,
            text,
        });
    }

    if cursor < decoded.len() {
        log::debug!("{} decoded text chunks left unpaired", decoded.len() - cursor);
    }

    paired
}

/// Decide whether one invocation survives the filters.
pub fn passes_filters(invocation: &Invocation, config: &ExtractorConfig) -> bool {
    if !config.allows(&invocation.operator) {
        return false;
    }
    if config.min_text_len == 0 {
        return true;
    }
    if invocation.is_text_showing() {
        invocation.text_len() >= config.min_text_len
    } else {
        config.length_filter == LengthFilterPolicy::KeepNonText
    }
}

/// Keep the invocations that pass the filters and renumber them from 1.
pub fn apply_filters(invocations: Vec<Invocation>, config: &ExtractorConfig) -> Vec<Invocation> {
    invocations
        .into_iter()
        .filter(|inv| passes_filters(inv, config))
        .enumerate()
        .map(|(i, mut inv)| {
            inv.index = i + 1;
            inv
        })
        .collect()
}

/// Pairs a content stream's operators with decoded text and filters them.
#[derive(Debug, Clone, Default)]
pub struct OperatorExtractor {
    config: ExtractorConfig,
}

impl OperatorExtractor {
    /// Create an extractor with the given filters.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// The active filters.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract filtered invocations from raw stream bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_template_diff::config::ExtractorConfig;
    /// use pdf_template_diff::content::OperatorExtractor;
    ///
    /// let extractor = OperatorExtractor::new(ExtractorConfig::new());
    /// let decoded = vec!["A".to_string(), "B".to_string()];
    /// let ops = extractor.extract(b"[(A) -250 (B)] TJ", &decoded);
    /// assert_eq!(ops.len(), 1);
    /// assert_eq!(ops[0].text(), "AB");
    /// ```
    pub fn extract(&self, data: &[u8], decoded: &[String]) -> Vec<Invocation> {
        self.extract_tokens(tokenize(data), decoded)
    }

    /// Extract filtered invocations from an already tokenized stream.
    pub fn extract_tokens(&self, tokens: Vec<Token>, decoded: &[String]) -> Vec<Invocation> {
        let paired = pair_decoded_text(group_invocations(tokens), decoded);
        apply_filters(paired, &self.config)
    }

    /// Extract and render every surviving invocation as one line.
    pub fn render_lines(&self, data: &[u8], decoded: &[String]) -> Vec<String> {
        self.extract(data, decoded)
            .iter()
            .map(|inv| format!("{:>5}: {}", inv.index, inv.render()))
            .collect()
    }
}
