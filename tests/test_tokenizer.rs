//! Integration tests for the content stream tokenizer.
//!
//! Covers real-world stream shapes and the robustness guarantees the rest of
//! the pipeline depends on: the tokenizer never fails, and every token maps
//! back onto the exact source bytes.

use pdf_template_diff::lexer::{array_elements, tokenize, TokenKind};
use proptest::prelude::*;

fn kinds(data: &[u8]) -> Vec<TokenKind> {
    tokenize(data).into_iter().map(|t| t.kind).collect()
}

mod stream_shapes {
    use super::*;

    #[test]
    fn test_text_object() {
        let tokens = tokenize(b"BT\n/F1 12 Tf\n72 712 Td\n[(Ex) 30 (ecu\\(t\\)ado)] TJ\nET");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["BT", "/F1", "12", "Tf", "72", "712", "Td", "[(Ex) 30 (ecu\\(t\\)ado)]", "TJ", "ET"]
        );
    }

    #[test]
    fn test_marked_content_with_dictionary() {
        assert_eq!(
            kinds(b"/Span <</ActualText <FEFF0041> /Lang (pt)>> BDC (A) Tj EMC"),
            vec![
                TokenKind::Name,
                TokenKind::Dictionary,
                TokenKind::Bare,
                TokenKind::LiteralString,
                TokenKind::Bare,
                TokenKind::Bare,
            ]
        );
    }

    #[test]
    fn test_nested_literal_parentheses() {
        let tokens = tokenize(b"(a (b) c) Tj");
        assert_eq!(tokens[0].text, "(a (b) c)");
        assert_eq!(tokens[1].text, "Tj");
    }

    #[test]
    fn test_comments_are_dropped() {
        let tokens = tokenize(b"% generated\nq % save\r\nQ");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["q", "Q"]);
    }

    #[test]
    fn test_inline_image_data_is_skipped() {
        let tokens = tokenize(b"BI /W 2 /H 1 ID \x00)(]\xff EI Q");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["BI", "/W", "2", "/H", "1", "ID", "EI", "Q"]);
    }

    #[test]
    fn test_tj_array_elements() {
        let tokens = tokenize(b"[(Valor) -120 <523a>] TJ");
        let elements = array_elements(&tokens[0]);
        let element_kinds: Vec<TokenKind> = elements.iter().map(|t| t.kind).collect();
        assert_eq!(
            element_kinds,
            vec![TokenKind::LiteralString, TokenKind::Bare, TokenKind::HexString]
        );
    }

    #[test]
    fn test_latin1_round_trip() {
        let data = b"(Decis\xe3o) Tj";
        let tokens = tokenize(data);
        assert_eq!(tokens[0].text, "(Decis\u{e3}o)");
        assert_eq!(tokens[0].bytes(), b"(Decis\xe3o)");
    }
}

mod degraded_input {
    use super::*;

    #[test]
    fn test_unclosed_string_consumes_rest() {
        let tokens = tokenize(b"(never closed Tj ET");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::LiteralString);
        assert_eq!(tokens[0].text, "(never closed Tj ET");
    }

    #[test]
    fn test_unclosed_array_and_dictionary() {
        assert_eq!(kinds(b"[(a) (b) TJ"), vec![TokenKind::Array]);
        assert_eq!(kinds(b"<< /A 1 BDC"), vec![TokenKind::Dictionary]);
        assert_eq!(kinds(b"<4142"), vec![TokenKind::HexString]);
    }

    #[test]
    fn test_stray_closers_are_dropped() {
        let tokens = tokenize(b") ] > q");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "q");
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert!(tokenize(b"").is_empty());
        assert!(tokenize(b" \t\r\n\x0c").is_empty());
    }
}

proptest! {
    #[test]
    fn prop_tokenizer_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = tokenize(&data);
    }

    #[test]
    fn prop_tokens_map_to_source_bytes(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut last_end = 0usize;
        for token in tokenize(&data) {
            let bytes = token.bytes();
            prop_assert!(token.offset >= last_end);
            prop_assert!(!bytes.is_empty());
            prop_assert_eq!(&data[token.offset..token.offset + bytes.len()], bytes.as_slice());
            last_end = token.offset + bytes.len();
        }
    }

    #[test]
    fn prop_operator_text_survives_noise(
        prefix in "[a-z0-9 ]{0,20}",
        word in "[A-Za-z]{1,12}",
    ) {
        let stream = format!("{} ({}) Tj", prefix, word);
        let tokens = tokenize(stream.as_bytes());
        let last = tokens.last().map(|t| t.text.clone());
        prop_assert_eq!(last.as_deref(), Some("Tj"));
        let literal = format!("({})", word);
        prop_assert!(tokens.iter().any(|t| t.text == literal));
    }
}
