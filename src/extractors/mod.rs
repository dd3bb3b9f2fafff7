//! Entity recognition and named field extraction over aligned text bands.

pub mod entities;
pub mod fields;

pub use entities::{resolve_overlaps, Entity, EntityAnnotator};
pub use fields::{normalize_field_value, FieldExtractor, FieldMap, FieldOutput, FieldSource, RegexRule};
