//! Content stream operator extraction.
//!
//! This module groups lexed tokens into operator invocations, pairs the
//! text-showing ones with decoded text and filters the result for
//! comparison.

pub mod operators;
pub mod parser;
pub mod text;

pub use operators::{is_operator, is_text_showing, Invocation, OPERATORS, TEXT_SHOWING_OPERATORS};
pub use parser::{
    apply_filters, group_invocations, pair_decoded_text, OperatorExtractor, RawInvocation,
};
pub use text::SimpleTextDecoder;
