//! Decoded text for string operands of simple-font content streams.
//!
//! Real documents need the active font's encoding (ToUnicode CMaps, CID
//! fonts) to decode text, which is the document model's job. For streams
//! whose fonts use single-byte encodings this module is enough: it emits one
//! chunk per string literal rendered by a text-showing invocation, in
//! document order, which is exactly the shape [`super::pair_decoded_text`]
//! expects.

use crate::content::operators::{is_text_showing, rendered_string_count, rendered_strings};
use crate::content::parser::group_invocations;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::text::{decode_utf16be, decode_winansi};

/// Decode PDF literal string escape sequences.
///
/// Handles ISO 32000-1:2008, Section 7.3.4.2 escapes:
///
/// - `\n`, `\r`, `\t`, `\b`, `\f`
/// - `\(`, `\)`, `\\`
/// - `\ddd` octal (1-3 digits)
/// - `\<newline>` line continuation (dropped)
///
/// An unknown escape keeps the backslash.
///
/// # Examples
///
/// ```
/// use pdf_template_diff::content::text::decode_literal_escapes;
///
/// assert_eq!(decode_literal_escapes(b"Se\\347\\343o"), b"Se\xe7\xe3o");
/// ```
pub fn decode_literal_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' || i + 1 >= raw.len() {
            result.push(raw[i]);
            i += 1;
            continue;
        }

        match raw[i + 1] {
            b'n' => result.push(b'\n'),
            b'r' => result.push(b'\r'),
            b't' => result.push(b'\t'),
            b'b' => result.push(8),
            b'f' => result.push(12),
            b'(' | b')' | b'\\' => result.push(raw[i + 1]),
            b'\n' => {},
            b'\r' => {
                if raw.get(i + 2) == Some(&b'\n') {
                    i += 1;
                }
            },
            b'0'..=b'7' => {
                let digits = raw[i + 1..]
                    .iter()
                    .take(3)
                    .take_while(|d| (b'0'..=b'7').contains(d))
                    .count();
                let value = raw[i + 1..i + 1 + digits]
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                result.push((value & 0xFF) as u8);
                i += 1 + digits;
                continue;
            },
            _ => {
                result.push(b'\\');
                i += 1;
                continue;
            },
        }
        i += 2;
    }

    result
}

/// Decode the digits of a hex string; an odd final digit is padded with 0.
pub fn decode_hex_digits(raw: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = raw
        .iter()
        .filter_map(|&b| char::from(b).to_digit(16).map(|d| d as u8))
        .collect();
    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

/// Raw bytes a string token stands for, delimiters and escapes removed.
pub fn string_token_bytes(token: &Token) -> Vec<u8> {
    let raw = token.bytes();
    match token.kind {
        TokenKind::LiteralString => {
            let inner = raw.strip_prefix(b"(").unwrap_or(&raw);
            let inner = inner.strip_suffix(b")").unwrap_or(inner);
            decode_literal_escapes(inner)
        },
        TokenKind::HexString => {
            let inner = raw.strip_prefix(b"<").unwrap_or(&raw);
            let inner = inner.strip_suffix(b">").unwrap_or(inner);
            decode_hex_digits(inner)
        },
        _ => Vec::new(),
    }
}

/// Decode one string token to Unicode.
///
/// UTF-16BE when the bytes start with a byte order mark, WinAnsi otherwise.
pub fn decode_string_token(token: &Token) -> String {
    let bytes = string_token_bytes(token);
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => decode_utf16be(utf16),
        None => decode_winansi(&bytes),
    }
}

/// Decoder for streams drawn with single-byte encoded fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTextDecoder;

impl SimpleTextDecoder {
    /// Create a decoder.
    pub fn new() -> Self {
        Self
    }

    /// Decoded text chunks of a content stream, one per rendered string.
    ///
    /// A `Tj`, `'` or `"` with no string operand still yields one (empty)
    /// chunk, so chunk counts always line up with the invocations.
    pub fn decode(&self, data: &[u8]) -> Vec<String> {
        let mut chunks = Vec::new();
        for inv in group_invocations(tokenize(data)) {
            if !is_text_showing(&inv.operator) {
                continue;
            }
            let strings = rendered_strings(&inv.operator, &inv.operands);
            if strings.is_empty() && rendered_string_count(&inv.operator, &inv.operands) > 0 {
                chunks.push(String::new());
                continue;
            }
            chunks.extend(strings.iter().map(decode_string_token));
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_sequences() {
        assert_eq!(decode_literal_escapes(b"a\\nb\\tc"), b"a\nb\tc");
        assert_eq!(decode_literal_escapes(b"\\(x\\)\\\\"), b"(x)\\");
        assert_eq!(decode_literal_escapes(b"line\\\ncontinued"), b"linecontinued");
        assert_eq!(decode_literal_escapes(b"line\\\r\ncontinued"), b"linecontinued");
        assert_eq!(decode_literal_escapes(b"\\q"), b"\\q");
        assert_eq!(decode_literal_escapes(b"end\\"), b"end\\");
    }

    #[test]
    fn test_octal_escapes() {
        assert_eq!(decode_literal_escapes(b"\\247 71"), b"\xa7 71");
        assert_eq!(decode_literal_escapes(b"\\0053"), b"\x053");
        assert_eq!(decode_literal_escapes(b"\\7"), b"\x07");
    }

    #[test]
    fn test_hex_digits() {
        assert_eq!(decode_hex_digits(b"48656C6C6F"), b"Hello");
        assert_eq!(decode_hex_digits(b"48 65 6"), b"He\x60");
        assert!(decode_hex_digits(b"").is_empty());
    }

    #[test]
    fn test_decode_string_tokens() {
        let tokens = tokenize(b"(Execu\\347\\343o) <FEFF00C9> <41>");
        assert_eq!(decode_string_token(&tokens[0]), "Execução");
        assert_eq!(decode_string_token(&tokens[1]), "É");
        assert_eq!(decode_string_token(&tokens[2]), "A");
    }

    #[test]
    fn test_decoder_emits_one_chunk_per_string() {
        let stream = b"BT /F1 10 Tf (Autor:) Tj [(FU) -20 (LANO)] TJ (x) ' Tj ET";
        let chunks = SimpleTextDecoder::new().decode(stream);
        assert_eq!(chunks, vec!["Autor:", "FU", "LANO", "x", ""]);
    }

    #[test]
    fn test_decoder_ignores_strings_outside_text_operators() {
        let chunks = SimpleTextDecoder::new().decode(b"/P <</ActualText (hidden)>> BDC (shown) Tj EMC");
        assert_eq!(chunks, vec!["shown"]);
    }
}
