//! Pair alignment of two documents generated from the same template.
//!
//! - [`engine`]: front-head/back-tail walk with drift tolerance
//! - [`band`]: front head, middle and back tail as text bands
//! - [`page`]: dispatch page detection and document-level alignment
//! - [`report`]: plain-text report rendering

pub mod band;
pub mod engine;
pub mod page;
pub mod report;

pub use band::{bands_for, middle_range, side_bands, Band, TextBand};
pub use engine::{AlignRangeResult, AlignRangeValue, AlignmentEngine};
pub use page::{align_documents, detect_dispatch_page, page_operators, select_page, DocumentAlignment, PageOperators};
pub use report::render_report;
