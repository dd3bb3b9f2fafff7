//! Document object model boundary.
//!
//! Cross-reference resolution, object streams and encryption live outside
//! this crate. Whatever parses the PDF container exposes it through
//! [`DocumentModel`]: objects by id, decoded stream bytes, page contents and
//! a font-aware text decoder.
//!
//! [`MemoryDocument`] implements the trait over in-memory streams. It backs
//! the tests and the `align_pair` binary, decoding text with
//! [`SimpleTextDecoder`].

use crate::config::ExtractorConfig;
use crate::content::operators::Invocation;
use crate::content::parser::{apply_filters, group_invocations, pair_decoded_text};
use crate::content::text::SimpleTextDecoder;
use crate::decoders::decode_stream;
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use std::collections::BTreeMap;

/// Object number.
pub type ObjectId = u32;

/// Dictionary metadata of one object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectInfo {
    /// Object number
    pub id: ObjectId,
    /// `/Type` value without the slash
    pub type_name: Option<String>,
    /// `/Subtype` value without the slash
    pub subtype: Option<String>,
    /// True if the object carries stream data
    pub has_stream: bool,
}

/// Read access to a parsed PDF.
pub trait DocumentModel {
    /// Every object number, ascending.
    fn object_ids(&self) -> Vec<ObjectId>;

    /// Dictionary metadata of an object.
    fn object(&self, id: ObjectId) -> Result<ObjectInfo>;

    /// Stream bytes with all filters applied.
    fn stream_bytes(&self, id: ObjectId) -> Result<Vec<u8>>;

    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Content stream objects of a page (0-indexed), in drawing order.
    fn page_contents(&self, page: usize) -> Result<Vec<ObjectId>>;

    /// Page whose resources apply to the object (its own page for content
    /// streams, the page drawing it for form XObjects).
    fn locate_page(&self, id: ObjectId) -> Option<usize>;

    /// Decoded text chunks of a content stream, one per string literal
    /// rendered by a text-showing operator, in document order.
    fn decoded_text(&self, id: ObjectId) -> Result<Vec<String>>;
}

/// One content stream of a page with its decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPart {
    /// Stream object
    pub id: ObjectId,
    /// Filtered stream bytes
    pub data: Vec<u8>,
    /// Decoded text chunks (empty when decoding failed)
    pub decoded: Vec<String>,
}

/// All content streams of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// Page index (0-based)
    pub page: usize,
    /// Content streams in drawing order
    pub parts: Vec<ContentPart>,
}

impl PageContent {
    /// Load the content streams of `page`.
    ///
    /// A stream whose text cannot be decoded is kept with no text; missing
    /// pages or streams are errors.
    pub fn load<D: DocumentModel + ?Sized>(doc: &D, page: usize) -> Result<Self> {
        let count = doc.page_count();
        if page >= count {
            return Err(Error::PageOutOfRange { page, count });
        }

        let mut parts = Vec::new();
        for id in doc.page_contents(page)? {
            let data = doc.stream_bytes(id)?;
            let decoded = doc.decoded_text(id).unwrap_or_else(|e| {
                log::warn!("Text decoding failed for object {} on page {}: {}", id, page, e);
                Vec::new()
            });
            parts.push(ContentPart { id, data, decoded });
        }

        Ok(Self { page, parts })
    }

    /// Paired invocations of every stream, concatenated, then filtered.
    ///
    /// Pairing runs per stream so one stream's decoding failure cannot shift
    /// the text of the next.
    pub fn invocations(&self, config: &ExtractorConfig) -> Vec<Invocation> {
        let mut all: Vec<Invocation> = Vec::new();
        for part in &self.parts {
            let offset = all.len();
            let paired = pair_decoded_text(group_invocations(tokenize(&part.data)), &part.decoded);
            all.extend(paired.into_iter().map(|mut inv| {
                inv.raw_index += offset;
                inv.index = inv.raw_index;
                inv
            }));
        }
        apply_filters(all, config)
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryObject {
    info: ObjectInfo,
    raw: Option<Vec<u8>>,
    filters: Vec<String>,
    text: Option<Vec<String>>,
    page: Option<usize>,
}

/// In-memory [`DocumentModel`].
///
/// # Examples
///
/// ```
/// use pdf_template_diff::document::{DocumentModel, MemoryDocument};
///
/// let doc = MemoryDocument::from_content_streams(vec![b"BT (Hello) Tj ET".to_vec()]);
/// assert_eq!(doc.page_count(), 1);
/// let id = doc.page_contents(0).unwrap()[0];
/// assert_eq!(doc.decoded_text(id).unwrap(), vec!["Hello"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    objects: BTreeMap<ObjectId, MemoryObject>,
    pages: Vec<Vec<ObjectId>>,
    next_id: ObjectId,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// One page per stream; each stream is uncompressed content.
    pub fn from_content_streams(streams: Vec<Vec<u8>>) -> Self {
        let mut doc = Self::new();
        for data in streams {
            doc.add_page_stream(data);
        }
        doc
    }

    fn allocate(&mut self, object: MemoryObject) -> ObjectId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.objects.insert(
            id,
            MemoryObject {
                info: ObjectInfo { id, ..object.info },
                ..object
            },
        );
        id
    }

    /// Add a dictionary object without stream data.
    pub fn add_dictionary(&mut self, type_name: Option<&str>, subtype: Option<&str>) -> ObjectId {
        self.allocate(MemoryObject {
            info: ObjectInfo {
                type_name: type_name.map(str::to_string),
                subtype: subtype.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    /// Add a stream object with raw (still filtered) bytes.
    pub fn add_stream(&mut self, raw: Vec<u8>, filters: Vec<String>) -> ObjectId {
        self.allocate(MemoryObject {
            info: ObjectInfo {
                has_stream: true,
                ..Default::default()
            },
            raw: Some(raw),
            filters,
            ..Default::default()
        })
    }

    /// Append a page drawn by the given content streams.
    pub fn add_page(&mut self, contents: Vec<ObjectId>) -> usize {
        let page = self.pages.len();
        for id in &contents {
            if let Some(object) = self.objects.get_mut(id) {
                object.page = Some(page);
            }
        }
        self.pages.push(contents);
        page
    }

    /// Append a page with one uncompressed content stream.
    pub fn add_page_stream(&mut self, data: Vec<u8>) -> usize {
        let id = self.add_stream(data, Vec::new());
        self.add_page(vec![id])
    }

    /// Add a form XObject drawn on `page`.
    pub fn add_form_xobject(&mut self, page: usize, raw: Vec<u8>, filters: Vec<String>) -> ObjectId {
        let id = self.add_stream(raw, filters);
        if let Some(object) = self.objects.get_mut(&id) {
            object.info.type_name = Some("XObject".to_string());
            object.info.subtype = Some("Form".to_string());
            object.page = Some(page);
        }
        id
    }

    /// Set explicit `/Type` and `/Subtype` on an object.
    pub fn set_type(&mut self, id: ObjectId, type_name: Option<&str>, subtype: Option<&str>) -> Result<()> {
        let object = self.objects.get_mut(&id).ok_or(Error::ObjectNotFound(id))?;
        object.info.type_name = type_name.map(str::to_string);
        object.info.subtype = subtype.map(str::to_string);
        Ok(())
    }

    /// Replace the decoded text of a stream, as a font-aware decoder would
    /// produce it.
    pub fn set_decoded_text(&mut self, id: ObjectId, chunks: Vec<String>) -> Result<()> {
        let object = self.objects.get_mut(&id).ok_or(Error::ObjectNotFound(id))?;
        object.text = Some(chunks);
        Ok(())
    }

    fn get(&self, id: ObjectId) -> Result<&MemoryObject> {
        self.objects.get(&id).ok_or(Error::ObjectNotFound(id))
    }
}

impl DocumentModel for MemoryDocument {
    fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    fn object(&self, id: ObjectId) -> Result<ObjectInfo> {
        Ok(self.get(id)?.info.clone())
    }

    fn stream_bytes(&self, id: ObjectId) -> Result<Vec<u8>> {
        let object = self.get(id)?;
        let raw = object.raw.as_ref().ok_or(Error::NotAStream(id))?;
        decode_stream(raw, &object.filters)
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_contents(&self, page: usize) -> Result<Vec<ObjectId>> {
        self.pages.get(page).cloned().ok_or(Error::PageOutOfRange {
            page,
            count: self.pages.len(),
        })
    }

    fn locate_page(&self, id: ObjectId) -> Option<usize> {
        self.objects.get(&id).and_then(|o| o.page)
    }

    fn decoded_text(&self, id: ObjectId) -> Result<Vec<String>> {
        let object = self.get(id)?;
        if let Some(text) = &object.text {
            return Ok(text.clone());
        }
        let data = self.stream_bytes(id)?;
        Ok(SimpleTextDecoder::new().decode(&data))
    }
}
