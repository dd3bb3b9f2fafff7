//! Content stream lexer (tokenizer).
//!
//! Splits raw content-stream bytes into a flat sequence of syntactic tokens:
//! operands (strings, dictionaries, arrays, names, numbers) and operator names.
//! Nothing here interprets the tokens; grouping them into operator invocations
//! is the job of [`crate::content::parser`].
//!
//! # Token classes
//!
//! - Literal strings: `(Hello \(world\))`, balanced on parentheses, `\` escapes the next byte
//! - Hex strings: `<48656C6C6F>`
//! - Dictionaries: `<< /Type /Page >>`, balanced on `<<`/`>>`
//! - Arrays: `[(A) -250 (B)]`, balanced by raw bracket counting
//! - Names: `/F1`
//! - Bare tokens: operators and numbers (`Tj`, `12.5`, `T*`)
//!
//! Whitespace (space, `\t`, `\r`, `\n`, `\f`) and comments (`%` to end of line)
//! are dropped.
//!
//! The lexer never fails. An unbalanced delimiter consumes the rest of the
//! buffer into one degraded token, so a single corrupt stream cannot abort the
//! processing of its document.
//!
//! Every token keeps its raw text decoded byte-for-byte as Latin-1, which makes
//! `Token::bytes` an exact inverse.

use nom::{
    bytes::complete::{take_till, take_while, take_while1},
    character::complete::char,
    combinator::recognize,
    sequence::preceded,
    IResult,
};

/// Syntactic class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `( ... )`
    LiteralString,
    /// `< ... >`
    HexString,
    /// `<< ... >>`
    Dictionary,
    /// `[ ... ]`
    Array,
    /// `/Name`
    Name,
    /// Operator names, numbers, keywords
    Bare,
}

/// One lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token class
    pub kind: TokenKind,
    /// Raw token text, Latin-1 decoded (delimiters included)
    pub text: String,
    /// Byte offset of the first byte in the source buffer
    pub offset: usize,
}

impl Token {
    /// Raw bytes of the token.
    pub fn bytes(&self) -> Vec<u8> {
        self.text.chars().map(|c| c as u32 as u8).collect()
    }

    /// True for literal and hex strings.
    pub fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::LiteralString | TokenKind::HexString)
    }

    /// True for bare tokens, the only class that can name an operator.
    pub fn is_bare(&self) -> bool {
        self.kind == TokenKind::Bare
    }
}

/// PDF whitespace accepted between tokens.
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | 0x0C)
}

/// PDF delimiter characters.
pub fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

/// Decode bytes as Latin-1 so every byte value maps to exactly one char.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Tokenize a whole content stream.
///
/// # Examples
///
/// ```
/// use pdf_template_diff::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize(b"(Hello \\(world\\)) Tj");
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0].kind, TokenKind::LiteralString);
/// assert_eq!(tokens[1].text, "Tj");
/// ```
pub fn tokenize(data: &[u8]) -> Vec<Token> {
    Tokenizer::new(data).collect()
}

/// Re-scan the inside of an array token and return its element tokens.
///
/// Used to find the string literals of a `TJ` operand. Non-array tokens yield
/// an empty list.
pub fn array_elements(token: &Token) -> Vec<Token> {
    if token.kind != TokenKind::Array {
        return Vec::new();
    }
    let bytes = token.bytes();
    let inner = bytes.strip_prefix(b"[").unwrap_or(&bytes);
    let inner = inner.strip_suffix(b"]").unwrap_or(inner);
    tokenize(inner)
}

/// Streaming tokenizer over a byte buffer.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    data: &'a [u8],
    pos: usize,
    skip_inline_data: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            skip_inline_data: false,
        }
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn emit(&mut self, kind: TokenKind, start: usize, len: usize) -> Token {
        let end = (start + len).min(self.data.len());
        self.pos = end;
        Token {
            kind,
            text: latin1(&self.data[start..end]),
            offset: start,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if self.skip_inline_data {
                self.skip_inline_data = false;
                self.pos += inline_image_data_len(&self.data[self.pos..]);
            }

            let data = self.data;
            let start = self.pos;
            let input = &data[start..];
            let &byte = input.first()?;

            match byte {
                b if is_whitespace(b) => {
                    self.pos += whitespace(input).map_or(1, |(rest, _)| input.len() - rest.len());
                },
                b'%' => {
                    self.pos += comment(input).map_or(input.len(), |(rest, _)| input.len() - rest.len());
                },
                b'(' => {
                    let (len, closed) = scan_literal_string(input);
                    if !closed {
                        log::debug!("Unbalanced literal string at byte {}, consuming to end", start);
                    }
                    return Some(self.emit(TokenKind::LiteralString, start, len));
                },
                b'<' if input.get(1) == Some(&b'<') => {
                    let (len, closed) = scan_dictionary(input);
                    if !closed {
                        log::debug!("Unbalanced dictionary at byte {}, consuming to end", start);
                    }
                    return Some(self.emit(TokenKind::Dictionary, start, len));
                },
                b'<' => {
                    let (len, closed) = scan_hex_string(input);
                    if !closed {
                        log::debug!("Unterminated hex string at byte {}, consuming to end", start);
                    }
                    return Some(self.emit(TokenKind::HexString, start, len));
                },
                b'[' => {
                    let (len, closed) = scan_array(input);
                    if !closed {
                        log::debug!("Unbalanced array at byte {}, consuming to end", start);
                    }
                    return Some(self.emit(TokenKind::Array, start, len));
                },
                b'/' => {
                    let len = name(input).map_or(1, |(rest, _)| input.len() - rest.len());
                    return Some(self.emit(TokenKind::Name, start, len));
                },
                b'{' | b'}' => {
                    return Some(self.emit(TokenKind::Bare, start, 1));
                },
                b')' | b'>' | b']' => {
                    log::debug!("Stray '{}' at byte {}", byte as char, start);
                    self.pos += 1;
                },
                _ => {
                    let len = bare(input).map_or(1, |(rest, _)| input.len() - rest.len());
                    let token = self.emit(TokenKind::Bare, start, len);
                    if token.text == "ID" {
                        self.skip_inline_data = true;
                    }
                    return Some(token);
                },
            }
        }
    }
}

fn whitespace(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(is_whitespace)(input)
}

/// `%` to end of line, line terminator included.
fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    let (rest, _) = preceded(char('%'), take_till(|c| c == b'\r' || c == b'\n'))(input)?;
    let rest = match rest {
        [b'\r', b'\n', tail @ ..] => tail,
        [b'\r' | b'\n', tail @ ..] => tail,
        _ => rest,
    };
    Ok((rest, ()))
}

fn name(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(preceded(char('/'), take_while(|c| !is_whitespace(c) && !is_delimiter(c))))(input)
}

fn bare(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(|c| !is_whitespace(c) && !is_delimiter(c))(input)
}

/// Length of a literal string starting at `(`, and whether it closed.
///
/// A backslash protects the following byte from depth counting, whatever it is.
fn scan_literal_string(input: &[u8]) -> (usize, bool) {
    let mut depth = 0usize;
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'\\' => {
                i += 2;
                continue;
            },
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return (i + 1, true);
                }
            },
            _ => {},
        }
        i += 1;
    }
    (input.len(), false)
}

/// Length of a hex string starting at `<`, and whether it closed.
fn scan_hex_string(input: &[u8]) -> (usize, bool) {
    match input.iter().skip(1).position(|&b| b == b'>') {
        Some(p) => (p + 2, true),
        None => (input.len(), false),
    }
}

/// Length of a dictionary starting at `<<`, and whether it closed.
///
/// Nested dictionaries raise the depth; nested literal and hex strings are
/// skipped whole so their brackets do not count.
fn scan_dictionary(input: &[u8]) -> (usize, bool) {
    let mut depth = 0usize;
    let mut i = 0;
    while i < input.len() {
        let rest = &input[i..];
        if rest.starts_with(b"<<") {
            depth += 1;
            i += 2;
        } else if rest.starts_with(b">>") {
            depth = depth.saturating_sub(1);
            i += 2;
            if depth == 0 {
                return (i, true);
            }
        } else if rest[0] == b'(' {
            i += scan_literal_string(rest).0;
        } else if rest[0] == b'<' {
            i += scan_hex_string(rest).0;
        } else {
            i += 1;
        }
    }
    (input.len(), false)
}

/// Length of an array starting at `[`, and whether it closed.
///
/// Raw bracket counting: brackets inside nested literal strings are counted
/// too. Array tokens are only ever re-scanned for their string elements, so
/// this never feeds an object parser.
fn scan_array(input: &[u8]) -> (usize, bool) {
    let mut depth = 0usize;
    for (i, &b) in input.iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return (i + 1, true);
                }
            },
            _ => {},
        }
    }
    (input.len(), false)
}

/// Bytes of inline image data following an `ID` operator.
///
/// Stops at the whitespace preceding an `EI` that is itself followed by
/// whitespace, a delimiter or the end of the buffer.
fn inline_image_data_len(input: &[u8]) -> usize {
    for i in 0..input.len().saturating_sub(2) {
        if is_whitespace(input[i]) && &input[i + 1..i + 3] == b"EI" {
            match input.get(i + 3) {
                None => return i,
                Some(&b) if is_whitespace(b) || is_delimiter(b) => return i,
                _ => {},
            }
        }
    }
    input.len()
}
