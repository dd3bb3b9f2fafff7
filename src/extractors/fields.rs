//! Named field extraction from aligned text bands.
//!
//! A [`FieldMap`] declares, per field, an ordered list of sources. Each
//! source names a band and how to find the value in it: entity labels
//! (tried first) and regex rules (tried second). The first source that
//! produces a non-empty value wins.
//!
//! ```json
//! {
//!   "PROCESSO": [{ "band": "head", "labels": ["CNJ", "CNJ_PARTIAL"] }],
//!   "VALOR": [
//!     { "band": "middle", "labels": ["MONEY"] },
//!     { "band": "tail", "rules": [{ "pattern": "valor:\\s*(\\S+)" }] }
//!   ]
//! }
//! ```

use crate::align::band::{Band, TextBand};
use crate::error::{Error, Result};
use crate::extractors::entities::{Entity, EntityAnnotator};
use crate::text::{collapse_whitespace, format_cpf};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A regex extraction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexRule {
    /// Pattern, matched case-insensitively with `.` spanning newlines
    pub pattern: String,
    /// Capture group to take (default: 1 if the pattern has groups, else 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<usize>,
}

impl RegexRule {
    /// Rule taking the default group.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            group: None,
        }
    }

    /// Rule taking an explicit group.
    pub fn with_group(pattern: impl Into<String>, group: usize) -> Self {
        Self {
            pattern: pattern.into(),
            group: Some(group),
        }
    }

    /// Compile the pattern.
    pub fn compile(&self) -> Result<Regex> {
        RegexBuilder::new(&self.pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| Error::InvalidRegex {
                pattern: self.pattern.clone(),
                reason: e.to_string(),
            })
    }
}

/// One place to look for a field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSource {
    /// Band name or alias
    pub band: String,
    /// Entity labels, in preference order
    #[serde(default, alias = "entities")]
    pub labels: Vec<String>,
    /// Regex rules, in preference order
    #[serde(default, alias = "regex")]
    pub rules: Vec<RegexRule>,
}

impl FieldSource {
    /// Source reading `band` with no labels or rules yet.
    pub fn new(band: impl Into<String>) -> Self {
        Self {
            band: band.into(),
            labels: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Add an entity label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Add a regex rule.
    pub fn with_rule(mut self, rule: RegexRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Field name to ordered sources, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    fields: IndexMap<String, Vec<FieldSource>>,
}

impl FieldMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field.
    pub fn with_field(mut self, name: impl Into<String>, sources: Vec<FieldSource>) -> Self {
        self.fields.insert(name.into(), sources);
        self
    }

    /// Parse a JSON field map and check its band names.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: FieldMap = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Load a JSON field map from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read field map {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject unknown band names.
    pub fn validate(&self) -> Result<()> {
        for (name, sources) in &self.fields {
            for source in sources {
                if Band::parse(&source.band).is_none() {
                    return Err(Error::Config(format!(
                        "field {} uses unknown band '{}'",
                        name, source.band
                    )));
                }
            }
        }
        Ok(())
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<FieldSource>)> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Extraction result of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldOutput {
    /// Normalized value (empty when nothing was found)
    pub value: String,
    /// Raw text of the band the value came from, or of the first band tried
    pub value_full: String,
    /// Canonical name of that band
    pub source: String,
}

/// Normalize an extracted value for field `name`.
///
/// CPF fields holding 11 digits are regrouped as `###.###.###-##`; every
/// other value only has its whitespace collapsed.
///
/// ```
/// use pdf_template_diff::extractors::normalize_field_value;
///
/// assert_eq!(normalize_field_value("CPF_AUTOR", "12345678901"), "123.456.789-01");
/// assert_eq!(normalize_field_value("NOME", "  Maria \n da Silva "), "Maria da Silva");
/// ```
pub fn normalize_field_value(name: &str, value: &str) -> String {
    if name.to_uppercase().contains("CPF") {
        if let Some(cpf) = format_cpf(value) {
            return cpf;
        }
    }
    collapse_whitespace(value)
}

/// Applies a [`FieldMap`] to the bands of one document.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    annotator: EntityAnnotator,
    allowed: Vec<Band>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call caches: entities per band, compiled rules per pattern.
#[derive(Default)]
struct ExtractionCache {
    entities: HashMap<Band, Vec<Entity>>,
    rules: HashMap<String, Option<Regex>>,
}

impl FieldExtractor {
    /// Extractor allowing every band, with the built-in entity recognizers.
    pub fn new() -> Self {
        Self {
            annotator: EntityAnnotator::new(),
            allowed: Band::ALL.to_vec(),
        }
    }

    /// Use a custom annotator.
    pub fn with_annotator(mut self, annotator: EntityAnnotator) -> Self {
        self.annotator = annotator;
        self
    }

    /// Restrict extraction to the given bands.
    pub fn with_allowed_bands(mut self, bands: &[Band]) -> Self {
        self.allowed = bands.to_vec();
        self
    }

    /// Extract every declared field from `bands`.
    ///
    /// Always returns one output per declared field, in declaration order.
    pub fn extract(&self, fields: &FieldMap, bands: &[TextBand]) -> IndexMap<String, FieldOutput> {
        let mut cache = ExtractionCache::default();
        fields
            .iter()
            .map(|(name, sources)| (name.clone(), self.extract_field(name, sources, bands, &mut cache)))
            .collect()
    }

    fn extract_field(
        &self,
        name: &str,
        sources: &[FieldSource],
        bands: &[TextBand],
        cache: &mut ExtractionCache,
    ) -> FieldOutput {
        let mut output = FieldOutput::default();
        let mut visited = false;

        for source in sources {
            let Some(band) = self.eligible_band(name, source, bands) else {
                continue;
            };
            if !visited {
                output.value_full = band.value_full().to_string();
                output.source = band.band.to_string();
                visited = true;
            }

            let found = self
                .from_entities(source, band, cache)
                .or_else(|| Self::from_rules(source, band, cache));
            if let Some(value) = found {
                log::debug!("Field {} found in {}: {:?}", name, band.band, value);
                return FieldOutput {
                    value: normalize_field_value(name, &value),
                    value_full: band.value_full().to_string(),
                    source: band.band.to_string(),
                };
            }
        }

        log::debug!("Field {} not found in {} source(s)", name, sources.len());
        output
    }

    fn eligible_band<'b>(&self, name: &str, source: &FieldSource, bands: &'b [TextBand]) -> Option<&'b TextBand> {
        let Some(wanted) = Band::parse(&source.band) else {
            log::warn!("Field {}: unknown band '{}', source skipped", name, source.band);
            return None;
        };
        if !self.allowed.contains(&wanted) {
            return None;
        }
        bands.iter().find(|b| b.band == wanted && !b.is_empty())
    }

    fn from_entities(&self, source: &FieldSource, band: &TextBand, cache: &mut ExtractionCache) -> Option<String> {
        if source.labels.is_empty() {
            return None;
        }
        let entities = cache
            .entities
            .entry(band.band)
            .or_insert_with(|| self.annotator.annotate(&band.work_text));

        source.labels.iter().find_map(|label| {
            entities
                .iter()
                .find(|e| &e.label == label && !e.text.trim().is_empty())
                .map(|e| e.text.clone())
        })
    }

    fn from_rules(source: &FieldSource, band: &TextBand, cache: &mut ExtractionCache) -> Option<String> {
        for rule in &source.rules {
            let compiled = cache.rules.entry(rule.pattern.clone()).or_insert_with(|| match rule.compile() {
                Ok(regex) => Some(regex),
                Err(e) => {
                    log::warn!("Skipping rule: {}", e);
                    None
                },
            });
            let Some(regex) = compiled.as_ref() else {
                continue;
            };

            let group = rule
                .group
                .unwrap_or(if regex.captures_len() > 1 { 1 } else { 0 });
            let value = regex
                .captures(&band.work_text)
                .and_then(|caps| caps.get(group))
                .map(|m| m.as_str().trim().to_string())
                .filter(|v| !v.is_empty());
            if value.is_some() {
                return value;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::engine::AlignRangeValue;

    fn band(which: Band, text: &str) -> TextBand {
        TextBand::new(
            which,
            AlignRangeValue {
                start_op: 1,
                end_op: 1,
                value_full: text.to_string(),
            },
        )
    }

    fn bands() -> Vec<TextBand> {
        vec![
            band(Band::FrontHead, "Processo 0001234-56.2024.8.26.0100 Autor: FULANO DE TAL"),
            band(Band::Middle, "Valor da causa: R$ 10.500,00 CPF 12345678901"),
            band(Band::BackTail, "São Paulo, 12 de março de 2024"),
        ]
    }

    #[test]
    fn test_entity_source() {
        let map = FieldMap::new().with_field("PROCESSO", vec![FieldSource::new("head").with_label("CNJ")]);
        let out = FieldExtractor::new().extract(&map, &bands());
        assert_eq!(out["PROCESSO"].value, "0001234-56.2024.8.26.0100");
        assert_eq!(out["PROCESSO"].source, "front_head");
        assert!(out["PROCESSO"].value_full.starts_with("Processo"));
    }

    #[test]
    fn test_regex_source_default_group() {
        let map = FieldMap::new().with_field(
            "AUTOR",
            vec![FieldSource::new("front").with_rule(RegexRule::new(r"autor:\s*(.+)$"))],
        );
        let out = FieldExtractor::new().extract(&map, &bands());
        assert_eq!(out["AUTOR"].value, "FULANO DE TAL");
    }

    #[test]
    fn test_regex_explicit_and_missing_group() {
        let map = FieldMap::new()
            .with_field("WHOLE", vec![FieldSource::new("tail").with_rule(RegexRule::with_group(r"(\d+) de março", 0))])
            .with_field("NONE", vec![FieldSource::new("tail").with_rule(RegexRule::with_group(r"(\d+)", 4))]);
        let out = FieldExtractor::new().extract(&map, &bands());
        assert_eq!(out["WHOLE"].value, "12 de março");
        assert_eq!(out["NONE"].value, "");
        assert_eq!(out["NONE"].source, "back_tail");
    }

    #[test]
    fn test_entities_before_rules_and_first_source_wins() {
        let map = FieldMap::new().with_field(
            "VALOR",
            vec![
                FieldSource::new("middle")
                    .with_label("MONEY")
                    .with_rule(RegexRule::new(r"causa:\s*(\S+)")),
                FieldSource::new("tail").with_rule(RegexRule::new(r"(\d{4})")),
            ],
        );
        let out = FieldExtractor::new().extract(&map, &bands());
        assert_eq!(out["VALOR"].value, "R$ 10.500,00");
        assert_eq!(out["VALOR"].source, "middle");
    }

    #[test]
    fn test_falls_through_to_later_source() {
        let map = FieldMap::new().with_field(
            "DATA",
            vec![
                FieldSource::new("head").with_label("DATE"),
                FieldSource::new("tail").with_label("DATE"),
            ],
        );
        let out = FieldExtractor::new().extract(&map, &bands());
        assert_eq!(out["DATA"].value, "12 de março de 2024");
        assert_eq!(out["DATA"].source, "back_tail");
    }

    #[test]
    fn test_miss_keeps_first_visited_context() {
        let map = FieldMap::new().with_field(
            "EMAIL",
            vec![FieldSource::new("middle").with_label("EMAIL"), FieldSource::new("tail").with_label("EMAIL")],
        );
        let out = FieldExtractor::new().extract(&map, &bands());
        assert_eq!(out["EMAIL"].value, "");
        assert_eq!(out["EMAIL"].source, "middle");
        assert_eq!(out["EMAIL"].value_full, "Valor da causa: R$ 10.500,00 CPF 12345678901");
    }

    #[test]
    fn test_cpf_normalization() {
        let map = FieldMap::new().with_field("CPF_REU", vec![FieldSource::new("middle").with_label("CPF")]);
        let out = FieldExtractor::new().extract(&map, &bands());
        assert_eq!(out["CPF_REU"].value, "123.456.789-01");
    }

    #[test]
    fn test_invalid_rule_is_skipped() {
        let map = FieldMap::new().with_field(
            "VALOR",
            vec![FieldSource::new("middle")
                .with_rule(RegexRule::new(r"causa:\s*(R\$"))
                .with_rule(RegexRule::new(r"causa:\s*(R\$\s*[\d.,]+)"))],
        );
        let out = FieldExtractor::new().extract(&map, &bands());
        assert_eq!(out["VALOR"].value, "R$ 10.500,00");
    }

    #[test]
    fn test_disallowed_and_empty_bands_are_skipped() {
        let mut with_empty = bands();
        with_empty[1] = band(Band::Middle, "   ");
        let map = FieldMap::new().with_field(
            "VALOR",
            vec![FieldSource::new("middle").with_label("MONEY"), FieldSource::new("head").with_label("CNJ")],
        );

        let out = FieldExtractor::new().extract(&map, &with_empty);
        assert_eq!(out["VALOR"].source, "front_head");

        let out = FieldExtractor::new()
            .with_allowed_bands(&[Band::BackTail])
            .extract(&map, &bands());
        assert_eq!(out["VALOR"], FieldOutput::default());
    }

    #[test]
    fn test_field_map_json() {
        let json = r#"{
            "VALOR": [{"band": "mid", "labels": ["MONEY"]}],
            "AUTOR": [{"band": "head", "rules": [{"pattern": "autor:\\s*(.+)", "group": 1}]}]
        }"#;
        let map = FieldMap::from_json_str(json).unwrap();
        let names: Vec<&String> = map.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["VALOR", "AUTOR"]);

        let err = FieldMap::from_json_str(r#"{"X": [{"band": "footer"}]}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(matches!(FieldMap::from_json_str("[").unwrap_err(), Error::Json(_)));
    }

    #[test]
    fn test_output_order_follows_declaration() {
        let map = FieldMap::new()
            .with_field("Z", vec![])
            .with_field("A", vec![FieldSource::new("head")]);
        let out = FieldExtractor::new().extract(&map, &bands());
        let names: Vec<&String> = out.keys().collect();
        assert_eq!(names, vec!["Z", "A"]);
        assert_eq!(out["Z"], FieldOutput::default());
    }
}
