//! Text normalization for band text and extracted field values.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Any run of Unicode whitespace (NBSP included)
    static ref RE_WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    /// Characters that carry no text: soft hyphen, zero-width space/joiners, BOM
    static ref RE_INVISIBLE: Regex = Regex::new("[\u{00AD}\u{200B}\u{200C}\u{200D}\u{FEFF}]").unwrap();
}

/// Collapse every whitespace run into one space and trim the ends.
///
/// # Examples
///
/// ```
/// use pdf_template_diff::text::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  Processo \n\t n\u{00BA}  1 "), "Processo n\u{00BA} 1");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Build the working text of a band: invisible characters removed, whitespace collapsed.
///
/// Entity offsets and regex rules operate on this text, never on the raw
/// `value_full`.
pub fn normalize_work_text(text: &str) -> String {
    let visible = RE_INVISIBLE.replace_all(text, "");
    collapse_whitespace(&visible)
}

/// Whitespace-collapse `text` and wrap it in double quotes, escaping backslashes and quotes.
///
/// # Examples
///
/// ```
/// use pdf_template_diff::text::normalize::quoted;
///
/// assert_eq!(quoted("say  \"hi\""), r#""say \"hi\"""#);
/// ```
pub fn quoted(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let mut out = String::with_capacity(collapsed.len() + 2);
    out.push('"');
    for c in collapsed.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Replace Portuguese accented letters with their unaccented ASCII base.
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Regroup the digits of a CPF as `###.###.###-##`.
///
/// Returns `None` unless the value holds exactly 11 digits.
///
/// # Examples
///
/// ```
/// use pdf_template_diff::text::format_cpf;
///
/// assert_eq!(format_cpf("12345678901").as_deref(), Some("123.456.789-01"));
/// assert_eq!(format_cpf("123.456.789-01").as_deref(), Some("123.456.789-01"));
/// assert_eq!(format_cpf("1234"), None);
/// ```
pub fn format_cpf(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 {
        return None;
    }
    Some(format!("{}.{}.{}-{}", &digits[0..3], &digits[3..6], &digits[6..9], &digits[9..11]))
}
