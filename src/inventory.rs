//! Object inventory.
//!
//! Lists every object of a document with its `/Type` (and `/Subtype`), or a
//! derived type when the dictionary carries neither:
//!
//! - `texto`: stream whose content has text-showing operators
//! - `sem_texto`: content stream without text-showing operators
//! - `stream`: stream that yields no operator invocations (images, fonts,
//!   undecodable data)
//! - `dict`: object without a stream

use crate::content::is_text_showing;
use crate::content::parser::group_invocations;
use crate::document::{DocumentModel, ObjectId};
use crate::lexer::tokenize;
use serde::Serialize;
use std::fmt;

/// Type assigned to objects without explicit type metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedType {
    /// Content with text-showing operators
    Texto,
    /// Content without text-showing operators
    SemTexto,
    /// Opaque stream data
    Stream,
    /// No stream
    Dict,
}

impl DerivedType {
    /// Name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedType::Texto => "texto",
            DerivedType::SemTexto => "sem_texto",
            DerivedType::Stream => "stream",
            DerivedType::Dict => "dict",
        }
    }
}

impl fmt::Display for DerivedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inventory line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    /// Object number
    pub id: ObjectId,
    /// Page whose resources apply, if any
    pub page: Option<usize>,
    /// Explicit `Type/Subtype` or derived type name
    pub kind: String,
    /// True when `kind` was derived
    pub derived: bool,
    /// Number of text-showing invocations in the stream
    pub text_ops: usize,
}

/// Text-showing invocation count and total invocation count of a stream.
fn stream_profile<D: DocumentModel + ?Sized>(doc: &D, id: ObjectId) -> Option<(usize, usize)> {
    match doc.stream_bytes(id) {
        Ok(data) => {
            let invocations = group_invocations(tokenize(&data));
            let text = invocations
                .iter()
                .filter(|inv| is_text_showing(&inv.operator))
                .count();
            Some((text, invocations.len()))
        },
        Err(e) => {
            log::debug!("Object {} stream not decodable: {}", id, e);
            None
        },
    }
}

fn classify(has_stream: bool, profile: Option<(usize, usize)>) -> DerivedType {
    if !has_stream {
        return DerivedType::Dict;
    }
    match profile {
        Some((text, _)) if text > 0 => DerivedType::Texto,
        Some((_, total)) if total > 0 => DerivedType::SemTexto,
        _ => DerivedType::Stream,
    }
}

/// Derive the type of object `id` from its content, with its text-showing
/// invocation count.
pub fn derive_type<D: DocumentModel + ?Sized>(doc: &D, id: ObjectId, has_stream: bool) -> (DerivedType, usize) {
    let profile = if has_stream { stream_profile(doc, id) } else { None };
    (classify(has_stream, profile), profile.map_or(0, |(text, _)| text))
}

/// Inventory of every object, ascending by id.
///
/// Objects whose metadata cannot be read are logged and left out.
pub fn inventory<D: DocumentModel + ?Sized>(doc: &D) -> Vec<InventoryEntry> {
    let mut entries = Vec::new();

    for id in doc.object_ids() {
        let info = match doc.object(id) {
            Ok(info) => info,
            Err(e) => {
                log::warn!("Skipping object {} in inventory: {}", id, e);
                continue;
            },
        };

        let explicit = match (&info.type_name, &info.subtype) {
            (Some(t), Some(s)) => Some(format!("{}/{}", t, s)),
            (Some(t), None) => Some(t.clone()),
            (None, Some(s)) => Some(s.clone()),
            (None, None) => None,
        };

        let profile = if info.has_stream { stream_profile(doc, id) } else { None };
        let (kind, derived) = match explicit {
            Some(kind) => (kind, false),
            None => (classify(info.has_stream, profile).to_string(), true),
        };

        entries.push(InventoryEntry {
            id,
            page: doc.locate_page(id),
            kind,
            derived,
            text_ops: profile.map_or(0, |(text, _)| text),
        });
    }

    entries
}

/// Render the inventory one object per line.
pub fn render_inventory(entries: &[InventoryEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let page = e.page.map_or_else(|| "-".to_string(), |p| format!("p{}", p + 1));
            let marker = if e.derived { "*" } else { "" };
            format!("{:>5} {:>4} {}{} ({} text ops)\n", e.id, page, e.kind, marker, e.text_ops)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    #[test]
    fn test_derived_types() {
        let mut doc = MemoryDocument::new();
        let texto = doc.add_stream(b"BT (a) Tj ET".to_vec(), Vec::new());
        let sem_texto = doc.add_stream(b"q 1 0 0 1 0 0 cm Q".to_vec(), Vec::new());
        let opaque = doc.add_stream(vec![0xFF, 0xD8, 0xFF], Vec::new());
        let undecodable = doc.add_stream(vec![1, 2, 3], vec!["DCTDecode".to_string()]);
        let dict = doc.add_dictionary(None, None);
        doc.add_page(vec![texto, sem_texto]);

        assert_eq!(derive_type(&doc, texto, true), (DerivedType::Texto, 1));
        assert_eq!(derive_type(&doc, sem_texto, true).0, DerivedType::SemTexto);
        assert_eq!(derive_type(&doc, opaque, true).0, DerivedType::Stream);
        assert_eq!(derive_type(&doc, undecodable, true).0, DerivedType::Stream);
        assert_eq!(derive_type(&doc, dict, false).0, DerivedType::Dict);
    }

    #[test]
    fn test_inventory_prefers_explicit_types() {
        let mut doc = MemoryDocument::from_content_streams(vec![b"BT (a) Tj (b) Tj ET".to_vec()]);
        let catalog = doc.add_dictionary(Some("Catalog"), None);
        let form = doc.add_form_xobject(0, b"q Q".to_vec(), Vec::new());

        let entries = inventory(&doc);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, "texto");
        assert!(entries[0].derived);
        assert_eq!(entries[0].text_ops, 2);
        assert_eq!(entries[0].page, Some(0));

        let by_id = |id| entries.iter().find(|e| e.id == id).unwrap();
        assert_eq!(by_id(catalog).kind, "Catalog");
        assert!(!by_id(catalog).derived);
        assert_eq!(by_id(form).kind, "XObject/Form");
    }

    #[test]
    fn test_render_inventory() {
        let doc = MemoryDocument::from_content_streams(vec![b"BT (a) Tj ET".to_vec()]);
        assert_eq!(render_inventory(&inventory(&doc)), "    1   p1 texto* (1 text ops)\n");
    }
}
