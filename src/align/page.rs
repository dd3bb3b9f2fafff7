//! Page selection and document-level alignment.

use crate::align::engine::{AlignRangeResult, AlignmentEngine};
use crate::config::{AlignConfig, ExtractorConfig, PageSelection};
use crate::content::operators::Invocation;
use crate::document::{DocumentModel, PageContent};
use crate::error::{Error, Result};
use crate::text::fold_accents;

/// Invocations of one document page after filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOperators {
    /// Page index (0-based)
    pub page: usize,
    /// Filtered, renumbered invocations
    pub invocations: Vec<Invocation>,
}

/// Alignment of two documents, with the sequences it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAlignment {
    /// Document A page and invocations
    pub a: PageOperators,
    /// Document B page and invocations
    pub b: PageOperators,
    /// Front and back ranges
    pub ranges: AlignRangeResult,
}

/// Uppercase, accent-folded text used for keyword search.
fn search_key(text: &str) -> String {
    fold_accents(text).to_uppercase()
}

/// Find the dispatch page of a document.
///
/// The first page whose decoded text contains any keyword (ignoring case and
/// accents) wins. Without a keyword hit, the page with the most text-showing
/// invocations is used; ties go to the lowest index. Pages that fail to load
/// are skipped.
pub fn detect_dispatch_page<D: DocumentModel + ?Sized>(doc: &D, keywords: &[String]) -> Result<usize> {
    let count = doc.page_count();
    if count == 0 {
        return Err(Error::PageOutOfRange { page: 0, count });
    }

    let keys: Vec<String> = keywords
        .iter()
        .map(|k| search_key(k))
        .filter(|k| !k.is_empty())
        .collect();
    let all_ops = ExtractorConfig::new();
    let mut best: Option<(usize, usize)> = None;

    for page in 0..count {
        let content = match PageContent::load(doc, page) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Skipping page {} during dispatch detection: {}", page, e);
                continue;
            },
        };
        let invocations = content.invocations(&all_ops);
        let text: String = invocations
            .iter()
            .filter(|inv| inv.is_text_showing())
            .map(Invocation::text)
            .collect::<Vec<_>>()
            .join(" ");
        let key = search_key(&text);

        if let Some(hit) = keys.iter().find(|k| key.contains(k.as_str())) {
            log::debug!("Dispatch keyword {:?} found on page {}", hit, page);
            return Ok(page);
        }

        let shown = invocations.iter().filter(|inv| inv.is_text_showing()).count();
        if best.map_or(true, |(_, n)| shown > n) {
            best = Some((page, shown));
        }
    }

    match best {
        Some((page, shown)) => {
            log::info!(
                "No dispatch keyword found; using page {} ({} text invocations)",
                page,
                shown
            );
            Ok(page)
        },
        None => Err(Error::Decode("no page of the document could be loaded".to_string())),
    }
}

/// Resolve the page to align.
pub fn select_page<D: DocumentModel + ?Sized>(doc: &D, config: &AlignConfig) -> Result<usize> {
    match config.page {
        PageSelection::Index(page) => {
            let count = doc.page_count();
            if page < count {
                Ok(page)
            } else {
                Err(Error::PageOutOfRange { page, count })
            }
        },
        PageSelection::Dispatch => detect_dispatch_page(doc, &config.dispatch_keywords),
    }
}

/// Filtered invocations of the selected page.
pub fn page_operators<D: DocumentModel + ?Sized>(doc: &D, config: &AlignConfig) -> Result<PageOperators> {
    let page = select_page(doc, config)?;
    let invocations = PageContent::load(doc, page)?.invocations(&config.extractor_config());
    log::debug!("Page {}: {} invocations after filtering", page, invocations.len());
    Ok(PageOperators { page, invocations })
}

/// Select, extract and align the same logical page of two documents.
pub fn align_documents<A, B>(a: &A, b: &B, config: &AlignConfig) -> Result<DocumentAlignment>
where
    A: DocumentModel + ?Sized,
    B: DocumentModel + ?Sized,
{
    let a = page_operators(a, config)?;
    let b = page_operators(b, config)?;
    let ranges = AlignmentEngine::new(config).align(&a.invocations, &b.invocations);
    Ok(DocumentAlignment { a, b, ranges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    fn doc(pages: &[&str]) -> MemoryDocument {
        MemoryDocument::from_content_streams(pages.iter().map(|p| p.as_bytes().to_vec()).collect())
    }

    #[test]
    fn test_dispatch_keyword_ignores_case_and_accents() {
        let d = doc(&["BT (Capa) Tj ET", "BT (Despacho n\\272 12) Tj ET"]);
        assert_eq!(detect_dispatch_page(&d, &["despacho".to_string()]).unwrap(), 1);

        let d = doc(&["BT (x) Tj ET", "BT (DECIS\\303O) Tj ET"]);
        // \303 is WinAnsi "Ã"
        assert_eq!(detect_dispatch_page(&d, &["decisão".to_string()]).unwrap(), 1);
    }

    #[test]
    fn test_dispatch_falls_back_to_most_text() {
        let d = doc(&["BT (a) Tj ET", "BT (a) Tj (b) Tj ET", "BT (c) Tj (d) Tj ET"]);
        assert_eq!(detect_dispatch_page(&d, &["DESPACHO".to_string()]).unwrap(), 1);
    }

    #[test]
    fn test_dispatch_on_empty_document() {
        let d = MemoryDocument::new();
        assert!(detect_dispatch_page(&d, &[]).is_err());
    }

    #[test]
    fn test_explicit_page_out_of_range() {
        let d = doc(&["q Q"]);
        let err = select_page(&d, &AlignConfig::new().with_page(2)).unwrap_err();
        assert!(matches!(err, Error::PageOutOfRange { page: 2, count: 1 }));
    }

    #[test]
    fn test_align_documents_on_dispatch_page() {
        let a = doc(&["BT (cover) Tj ET", "BT (DESPACHO) Tj (Valor R$ 1,00) Tj (Fim) Tj ET"]);
        let b = doc(&["BT (DESPACHO) Tj (Valor R$ 2,00) Tj (Fim) Tj ET"]);
        let result = align_documents(&a, &b, &AlignConfig::new()).unwrap();
        assert_eq!((result.a.page, result.b.page), (1, 0));
        assert_eq!(result.a.invocations.len(), 3);
        assert_eq!(result.ranges.front_a.value_full, "DESPACHO");
        assert_eq!(result.ranges.back_b.value_full, "Fim");
    }
}
