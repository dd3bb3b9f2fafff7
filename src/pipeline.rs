//! End-to-end processing of one document pair.
//!
//! ```text
//! DocumentModel (A, B)
//!     → page selection and operator extraction
//!     → AlignmentEngine          (front_head / back_tail)
//!     → bands                    (front_head / middle / back_tail per side)
//!     → FieldExtractor           (fields per side)
//! ```
//!
//! Pairs are independent: a pipeline holds only immutable configuration and
//! can be shared across threads processing different pairs.

use crate::align::band::{bands_for, TextBand};
use crate::align::engine::{AlignRangeResult, AlignmentEngine};
use crate::align::page::align_documents;
use crate::align::report::render_report;
use crate::config::AlignConfig;
use crate::content::operators::Invocation;
use crate::document::DocumentModel;
use crate::error::Result;
use crate::extractors::fields::{FieldExtractor, FieldMap, FieldOutput};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Extracted fields of one document, in declaration order.
pub type FieldResults = IndexMap<String, FieldOutput>;

/// Everything computed for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairReport {
    /// Aligned page of document A (None when aligning raw sequences)
    pub page_a: Option<usize>,
    /// Aligned page of document B
    pub page_b: Option<usize>,
    /// Front and back ranges
    pub alignment: AlignRangeResult,
    /// Bands of document A
    pub bands_a: Vec<TextBand>,
    /// Bands of document B
    pub bands_b: Vec<TextBand>,
    /// Fields of document A
    pub fields_a: FieldResults,
    /// Fields of document B
    pub fields_b: FieldResults,
}

impl PairReport {
    /// Plain-text alignment report.
    pub fn render_alignment(&self, label_a: &str, label_b: &str) -> String {
        render_report(&self.alignment, label_a, label_b)
    }

    /// Field results as JSON.
    ///
    /// Split output is `{"a": {...}, "b": {...}}`; otherwise only document
    /// A's fields are written.
    pub fn fields_json(&self, split: bool) -> Result<Value> {
        let a = serde_json::to_value(&self.fields_a)?;
        if !split {
            return Ok(a);
        }
        let mut sides = Map::new();
        sides.insert("a".to_string(), a);
        sides.insert("b".to_string(), serde_json::to_value(&self.fields_b)?);
        Ok(Value::Object(sides))
    }
}

/// Aligns a pair and extracts its fields.
#[derive(Debug, Clone, Default)]
pub struct PairPipeline {
    config: AlignConfig,
    fields: FieldMap,
    extractor: FieldExtractor,
}

impl PairPipeline {
    /// Pipeline with the given alignment settings and no fields.
    pub fn new(config: AlignConfig) -> Self {
        Self {
            config,
            fields: FieldMap::new(),
            extractor: FieldExtractor::new(),
        }
    }

    /// Fields to extract from each side.
    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    /// Replace the field extractor (annotator, allowed bands).
    pub fn with_field_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Alignment settings.
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Process two documents.
    pub fn run<A, B>(&self, a: &A, b: &B) -> Result<PairReport>
    where
        A: DocumentModel + ?Sized,
        B: DocumentModel + ?Sized,
    {
        let aligned = align_documents(a, b, &self.config)?;
        log::info!(
            "Aligned page {} of A with page {} of B ({} / {} invocations)",
            aligned.a.page,
            aligned.b.page,
            aligned.a.invocations.len(),
            aligned.b.invocations.len()
        );
        let mut report = self.finish(aligned.ranges, &aligned.a.invocations, &aligned.b.invocations);
        report.page_a = Some(aligned.a.page);
        report.page_b = Some(aligned.b.page);
        Ok(report)
    }

    /// Process two already filtered invocation sequences.
    pub fn run_invocations(&self, ops_a: &[Invocation], ops_b: &[Invocation]) -> PairReport {
        let ranges = AlignmentEngine::new(&self.config).align(ops_a, ops_b);
        self.finish(ranges, ops_a, ops_b)
    }

    fn finish(&self, alignment: AlignRangeResult, ops_a: &[Invocation], ops_b: &[Invocation]) -> PairReport {
        let (bands_a, bands_b) = bands_for(&alignment, ops_a, ops_b);
        let fields_a = self.extractor.extract(&self.fields, &bands_a);
        let fields_b = self.extractor.extract(&self.fields, &bands_b);
        PairReport {
            page_a: None,
            page_b: None,
            alignment,
            bands_a,
            bands_b,
            fields_a,
            fields_b,
        }
    }
}
