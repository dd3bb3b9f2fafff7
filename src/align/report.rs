//! Plain-text alignment report.
//!
//! ```text
//! front_head:
//!   a: op1-12 "Poder Judiciario ..."
//!   b: op1-12 "Poder Judiciario ..."
//! back_tail:
//!   a: op15-30 "..."
//!   b: op0 ""
//! ```

use crate::align::engine::{AlignRangeResult, AlignRangeValue};
use crate::text::quoted;

fn range_line(label: &str, range: &AlignRangeValue) -> String {
    format!("  {}: {} {}\n", label, range.op_label(), quoted(&range.value_full))
}

/// Render the `front_head:` and `back_tail:` sections.
///
/// `label_a` and `label_b` name the documents (typically their file names).
///
/// # Examples
///
/// ```
/// use pdf_template_diff::align::{render_report, AlignRangeResult};
///
/// let report = render_report(&AlignRangeResult::default(), "a", "b");
/// assert_eq!(report, "front_head:\n  a: op0 \"\"\n  b: op0 \"\"\nback_tail:\n  a: op0 \"\"\n  b: op0 \"\"\n");
/// ```
pub fn render_report(result: &AlignRangeResult, label_a: &str, label_b: &str) -> String {
    let mut out = String::new();
    out.push_str("front_head:\n");
    out.push_str(&range_line(label_a, &result.front_a));
    out.push_str(&range_line(label_b, &result.front_b));
    out.push_str("back_tail:\n");
    out.push_str(&range_line(label_a, &result.back_a));
    out.push_str(&range_line(label_b, &result.back_b));
    out
}
