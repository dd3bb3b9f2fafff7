//! Content stream operator names and operator invocations.
//!
//! An [`Invocation`] is one operand-list-plus-operator unit of a content
//! stream, such as `/F1 12 Tf` or `[(A) -250 (B)] TJ`. Text-showing
//! invocations also carry the text the document's decoder rendered for them.

use crate::lexer::{array_elements, Token, TokenKind};
use crate::text::quoted;
use phf::{phf_set, Set};
use std::fmt;

/// Every operator name recognized when grouping tokens into invocations.
///
/// Graphics state, path construction and painting, clipping, text objects,
/// text state, text positioning and showing, XObjects and inline images,
/// plus colour, shading, marked-content, compatibility and Type 3 glyph
/// operators so their operands never leak into the following invocation.
pub static OPERATORS: Set<&'static str> = phf_set! {
    // Graphics state
    "q", "Q", "cm", "w", "J", "j", "M", "d", "ri", "i", "gs",
    // Path construction
    "m", "l", "c", "v", "y", "h", "re",
    // Path painting
    "S", "s", "f", "F", "f*", "B", "B*", "b", "b*", "n",
    // Clipping
    "W", "W*",
    // Text objects and state
    "BT", "ET", "Tc", "Tw", "Tz", "TL", "Tf", "Tr", "Ts",
    // Text positioning
    "Td", "TD", "Tm", "T*",
    // Text showing
    "Tj", "TJ", "'", "\"",
    // XObjects and inline images
    "Do", "BI", "ID", "EI",
    // Colour
    "CS", "cs", "SC", "SCN", "sc", "scn", "G", "g", "RG", "rg", "K", "k",
    // Shading
    "sh",
    // Marked content
    "BMC", "BDC", "EMC", "MP", "DP",
    // Compatibility
    "BX", "EX",
    // Type 3 glyphs
    "d0", "d1",
};

/// Operators that render text.
pub static TEXT_SHOWING_OPERATORS: Set<&'static str> = phf_set! { "Tj", "TJ", "'", "\"" };

/// True if `name` is a recognized content stream operator.
pub fn is_operator(name: &str) -> bool {
    OPERATORS.contains(name)
}

/// True if `name` is one of `Tj`, `TJ`, `'` or `"`.
pub fn is_text_showing(name: &str) -> bool {
    TEXT_SHOWING_OPERATORS.contains(name)
}

/// Number of string literals an invocation of `operator` renders.
///
/// `TJ` renders every string element of its array operand; the other
/// text-showing operators render exactly one string. Decoders emit one text
/// chunk per rendered string, so this is also the number of chunks the
/// invocation consumes.
pub fn rendered_string_count(operator: &str, operands: &[Token]) -> usize {
    match operator {
        "TJ" => operands
            .iter()
            .rev()
            .find(|t| t.kind == TokenKind::Array)
            .map_or(0, |array| array_elements(array).iter().filter(|t| t.is_string()).count()),
        "Tj" | "'" | "\"" => 1,
        _ => 0,
    }
}

/// The string tokens an invocation renders, in drawing order.
///
/// For `Tj`, `'` and `"` this is the last string operand (or nothing when the
/// operand is missing); for `TJ` the string elements of its array.
pub fn rendered_strings(operator: &str, operands: &[Token]) -> Vec<Token> {
    match operator {
        "TJ" => operands
            .iter()
            .rev()
            .find(|t| t.kind == TokenKind::Array)
            .map(|array| array_elements(array).into_iter().filter(Token::is_string).collect())
            .unwrap_or_default(),
        "Tj" | "'" | "\"" => operands
            .iter()
            .rev()
            .find(|t| t.is_string())
            .cloned()
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// One operator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// 1-based position in the (filtered) sequence this invocation belongs to
    pub index: usize,
    /// 1-based position among all invocations of the stream, before filtering
    pub raw_index: usize,
    /// Operand tokens in stream order
    pub operands: Vec<Token>,
    /// Operator name
    pub operator: String,
    /// Decoded text, present on text-showing invocations only
    pub text: Option<String>,
}

impl Invocation {
    /// True for `Tj`, `TJ`, `'` and `"`.
    pub fn is_text_showing(&self) -> bool {
        is_text_showing(&self.operator)
    }

    /// Decoded text, empty when absent.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Decoded text length in characters.
    pub fn text_len(&self) -> usize {
        self.text().chars().count()
    }

    /// Raw operand tokens joined by single spaces.
    pub fn operand_text(&self) -> String {
        self.operands
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render as one diff-friendly line: operands, operator, then the quoted
    /// decoded text for text-showing invocations.
    pub fn render(&self) -> String {
        let mut line = self.operand_text();
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&self.operator);
        if let Some(text) = &self.text {
            line.push_str(" => ");
            line.push_str(&quoted(text));
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn invocation(stream: &[u8], text: Option<&str>) -> Invocation {
        let mut tokens = tokenize(stream);
        let op = tokens.pop().expect("operator token");
        Invocation {
            index: 1,
            raw_index: 1,
            operands: tokens,
            operator: op.text,
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_operator_sets() {
        for name in ["q", "cm", "BT", "T*", "f*", "W*", "'", "\"", "BI", "ID", "EI", "rg", "BDC"] {
            assert!(is_operator(name), "{} should be an operator", name);
        }
        assert!(!is_operator("12"));
        assert!(!is_operator("true"));
        assert!(is_text_showing("TJ"));
        assert!(!is_text_showing("Td"));
    }

    #[test]
    fn test_tj_array_string_count() {
        let tokens = tokenize(b"[(A) -250 (B) 10 <43>]");
        assert_eq!(rendered_string_count("TJ", &tokens), 3);
        assert_eq!(rendered_strings("TJ", &tokens).len(), 3);
    }

    #[test]
    fn test_single_string_operators_count_one() {
        let tokens = tokenize(b"1 2 (x)");
        assert_eq!(rendered_string_count("\"", &tokens), 1);
        assert_eq!(rendered_strings("\"", &tokens)[0].text, "(x)");
        assert_eq!(rendered_string_count("Tj", &[]), 1);
        assert!(rendered_strings("Tj", &[]).is_empty());
        assert_eq!(rendered_string_count("Td", &tokens), 0);
    }

    #[test]
    fn test_render_text_invocation() {
        let inv = invocation(b"(Hello  World) Tj", Some("Hello  World"));
        assert_eq!(inv.render(), "(Hello  World) Tj => \"Hello World\"");
        assert_eq!(inv.text_len(), 12);
    }

    #[test]
    fn test_render_plain_invocation() {
        let inv = invocation(b"1 0 0 1 72 700 cm", None);
        assert_eq!(inv.to_string(), "1 0 0 1 72 700 cm");
        let bare = invocation(b"BT", None);
        assert_eq!(bare.to_string(), "BT");
    }
}
