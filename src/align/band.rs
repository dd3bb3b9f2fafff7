//! Text bands: the front head, middle and back tail of one document.

use crate::align::engine::{AlignRangeResult, AlignRangeValue};
use crate::content::operators::Invocation;
use crate::text::normalize_work_text;
use serde::Serialize;
use std::fmt;

/// A region of an aligned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Shared prefix
    FrontHead,
    /// Everything between the prefix and the suffix
    Middle,
    /// Shared suffix
    BackTail,
}

impl Band {
    /// All bands in document order.
    pub const ALL: [Band; 3] = [Band::FrontHead, Band::Middle, Band::BackTail];

    /// Parse a band name or one of its aliases, ignoring case.
    ///
    /// | Band        | Accepted names                  |
    /// |-------------|---------------------------------|
    /// | `front_head`| `front_head`, `front`, `head`   |
    /// | `middle`    | `middle`, `mid`, `body`, `variable` |
    /// | `back_tail` | `back_tail`, `back`, `tail`     |
    ///
    /// ```
    /// use pdf_template_diff::align::Band;
    ///
    /// assert_eq!(Band::parse("Tail"), Some(Band::BackTail));
    /// assert_eq!(Band::parse("footer"), None);
    /// ```
    pub fn parse(name: &str) -> Option<Band> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "front_head" | "front" | "head" => Some(Band::FrontHead),
            "middle" | "mid" | "body" | "variable" => Some(Band::Middle),
            "back_tail" | "back" | "tail" => Some(Band::BackTail),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Band::FrontHead => "front_head",
            Band::Middle => "middle",
            Band::BackTail => "back_tail",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One band of one document, ready for field extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBand {
    /// Which band
    pub band: Band,
    /// Operator range the band covers
    pub range: AlignRangeValue,
    /// Normalized text used for matching
    pub work_text: String,
}

impl TextBand {
    /// Wrap a range, deriving its work text from `value_full` alone.
    pub fn new(band: Band, range: AlignRangeValue) -> Self {
        let work_text = normalize_work_text(&range.value_full);
        Self {
            band,
            range,
            work_text,
        }
    }

    /// Wrap a range of `invocations`.
    ///
    /// The work text keeps invocations apart with a space, so text drawn by
    /// adjacent operators (a label, then a number) does not run together.
    /// `value_full` stays the plain concatenation.
    pub fn from_invocations(band: Band, range: AlignRangeValue, invocations: &[Invocation]) -> Self {
        let pieces: Vec<&str> = range
            .texts(invocations)
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();
        let work_text = normalize_work_text(&pieces.join(" "));
        Self {
            band,
            range,
            work_text,
        }
    }

    /// Raw concatenated text.
    pub fn value_full(&self) -> &str {
        &self.range.value_full
    }

    /// True when the band has no usable text.
    pub fn is_empty(&self) -> bool {
        self.work_text.is_empty()
    }
}

/// The invocations strictly between the front head and the back tail.
///
/// An unresolved front counts as ending before the first invocation, an
/// unresolved back as starting after the last. Overlapping heads and tails
/// leave no middle.
pub fn middle_range(invocations: &[Invocation], front: &AlignRangeValue, back: &AlignRangeValue) -> AlignRangeValue {
    let start = if front.is_resolved() { front.end_op + 1 } else { 1 };
    let end = if back.is_resolved() {
        back.start_op.saturating_sub(1)
    } else {
        invocations.len()
    };
    AlignRangeValue::from_range(invocations, start, end)
}

/// Bands of one side of an alignment.
pub fn side_bands(invocations: &[Invocation], front: &AlignRangeValue, back: &AlignRangeValue) -> Vec<TextBand> {
    vec![
        TextBand::from_invocations(Band::FrontHead, front.clone(), invocations),
        TextBand::from_invocations(Band::Middle, middle_range(invocations, front, back), invocations),
        TextBand::from_invocations(Band::BackTail, back.clone(), invocations),
    ]
}

/// Bands of document A and document B.
pub fn bands_for(result: &AlignRangeResult, ops_a: &[Invocation], ops_b: &[Invocation]) -> (Vec<TextBand>, Vec<TextBand>) {
    (
        side_bands(ops_a, &result.front_a, &result.back_a),
        side_bands(ops_b, &result.front_b, &result.back_b),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(texts: &[&str]) -> Vec<Invocation> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Invocation {
                index: i + 1,
                raw_index: i + 1,
                operands: Vec::new(),
                operator: "Tj".to_string(),
                text: Some(t.to_string()),
            })
            .collect()
    }

    #[test]
    fn test_band_aliases() {
        for name in ["front_head", "FRONT", "head", "front-head"] {
            assert_eq!(Band::parse(name), Some(Band::FrontHead));
        }
        for name in ["middle", "mid", "Body", "variable"] {
            assert_eq!(Band::parse(name), Some(Band::Middle));
        }
        for name in ["back_tail", "back", "tail"] {
            assert_eq!(Band::parse(name), Some(Band::BackTail));
        }
        assert_eq!(Band::parse(""), None);
        assert_eq!(Band::BackTail.to_string(), "back_tail");
    }

    #[test]
    fn test_middle_between_front_and_back() {
        let inv = ops(&["a", "b", "c", "d", "e"]);
        let front = AlignRangeValue::from_range(&inv, 1, 2);
        let back = AlignRangeValue::from_range(&inv, 5, 5);
        let middle = middle_range(&inv, &front, &back);
        assert_eq!(middle.op_label(), "op3-4");
        assert_eq!(middle.value_full, "cd");
    }

    #[test]
    fn test_middle_with_unresolved_anchors() {
        let inv = ops(&["a", "b", "c"]);
        let none = AlignRangeValue::unresolved();
        assert_eq!(middle_range(&inv, &none, &none).op_label(), "op1-3");
    }

    #[test]
    fn test_overlapping_anchors_leave_no_middle() {
        let inv = ops(&["a", "b", "c"]);
        let front = AlignRangeValue::from_range(&inv, 1, 3);
        let back = AlignRangeValue::from_range(&inv, 1, 3);
        assert!(!middle_range(&inv, &front, &back).is_resolved());
    }

    #[test]
    fn test_work_text_is_normalized() {
        let inv = ops(&["Autor:  ", "\tFULANO "]);
        let band = TextBand::new(Band::FrontHead, AlignRangeValue::from_range(&inv, 1, 2));
        assert_eq!(band.work_text, "Autor: FULANO");
        assert_eq!(band.value_full(), "Autor:  \tFULANO ");
    }

    #[test]
    fn test_adjacent_invocations_stay_apart_in_work_text() {
        let inv = ops(&["Executado:", "MARIA SOUZA", "", "12345678901"]);
        let front = AlignRangeValue::from_range(&inv, 1, 1);
        let bands = side_bands(&inv, &front, &AlignRangeValue::unresolved());

        let middle = &bands[1];
        assert_eq!(middle.range.op_label(), "op2-4");
        assert_eq!(middle.value_full(), "MARIA SOUZA12345678901");
        assert_eq!(middle.work_text, "MARIA SOUZA 12345678901");
        assert!(bands[2].work_text.is_empty());
    }
}
