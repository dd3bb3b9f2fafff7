// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::needless_range_loop)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Template Diff
//!
//! Structural diffing of PDF content streams for documents generated from
//! the same template (court filings, dispatches, invoices), and extraction
//! of the fields that vary between them.
//!
//! ## Core Features
//!
//! - **Tokenizer**: lossless, never-failing lexer for content stream syntax
//! - **Operator Extraction**: operand/operator grouping paired with decoded text
//! - **Alignment**: drift-tolerant front-head/back-tail anchor search over two
//!   operator sequences, with a bounded look-ahead instead of a full diff
//! - **Entity Recognition**: CPF, CNPJ, CNJ case numbers, amounts, dates, e-mails
//! - **Field Extraction**: declarative JSON field maps with entity and regex sources
//!
//! ## Architecture
//!
//! ```text
//! DocumentModel ─► lexer ─► content (invocations + text) ─► align ─► bands ─► extractors
//! ```
//!
//! The PDF container itself (cross-references, object streams, encryption)
//! is behind the [`document::DocumentModel`] trait.
//!
//! ## Quick Start
//!
//! ```
//! use pdf_template_diff::config::AlignConfig;
//! use pdf_template_diff::document::MemoryDocument;
//! use pdf_template_diff::extractors::{FieldMap, FieldSource};
//! use pdf_template_diff::pipeline::PairPipeline;
//!
//! # fn main() -> Result<(), pdf_template_diff::Error> {
//! let a = MemoryDocument::from_content_streams(vec![
//!     b"BT (DESPACHO) Tj (Valor: R$ 10,00) Tj (Cumpra-se.) Tj ET".to_vec(),
//! ]);
//! let b = MemoryDocument::from_content_streams(vec![
//!     b"BT (DESPACHO) Tj (Valor: R$ 99,00) Tj (Cumpra-se.) Tj ET".to_vec(),
//! ]);
//!
//! let fields = FieldMap::new().with_field("VALOR", vec![FieldSource::new("middle").with_label("MONEY")]);
//! let report = PairPipeline::new(AlignConfig::new()).with_fields(fields).run(&a, &b)?;
//!
//! assert_eq!(report.fields_a["VALOR"].value, "R$ 10,00");
//! assert_eq!(report.fields_b["VALOR"].value, "R$ 99,00");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Content stream parsing
pub mod content;
pub mod decoders;
pub mod lexer;
pub mod text;

// Document object model
pub mod document;
pub mod inventory;

// Alignment and field extraction
pub mod align;
pub mod extractors;
pub mod pipeline;

// Re-exports
pub use align::{AlignRangeResult, AlignRangeValue, AlignmentEngine, Band, TextBand};
pub use config::{AlignConfig, ExtractorConfig, LengthFilterPolicy, MatchMode, PageSelection};
pub use content::{Invocation, OperatorExtractor, SimpleTextDecoder};
pub use document::{DocumentModel, MemoryDocument};
pub use error::{Error, Result};
pub use extractors::{Entity, EntityAnnotator, FieldExtractor, FieldMap, FieldOutput, FieldSource, RegexRule};
pub use lexer::{tokenize, Token, TokenKind, Tokenizer};
pub use pipeline::{PairPipeline, PairReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pdf_template_diff");
    }
}
