//! Text helpers shared by the decoder and the field extractor.
//!
//! - [`encoding`]: single-byte WinAnsi decoding of string operands
//! - [`normalize`]: whitespace collapsing, accent folding and CPF formatting

pub mod encoding;
pub mod normalize;

pub use encoding::{decode_utf16be, decode_winansi, winansi_to_unicode};
pub use normalize::{collapse_whitespace, fold_accents, format_cpf, normalize_work_text, quoted};
