//! Document access via lopdf.
//!
//! Wraps [`lopdf::Document`] with the lookups the interpreter needs:
//! the page list, inherited page attributes, decoded content streams,
//! and resource dictionaries. Encrypted documents are rejected at open
//! time.

use std::path::Path as FilePath;
use std::sync::LazyLock;

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfsnip_core::Ctm;

use crate::error::BackendError;

static EMPTY_RESOURCES: LazyLock<Dictionary> = LazyLock::new(Dictionary::new);

/// Upper bound on reference chains and /Parent walks, so cyclic files
/// terminate.
const MAX_CHAIN: usize = 64;

/// A PDF document opened for region extraction.
#[derive(Debug)]
pub struct SnipDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
}

/// Page box and rotation read from the page tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBounds {
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    /// Intrinsic viewing rotation in clockwise degrees: 0, 90, 180 or 270.
    pub rotation: u16,
    media_x0: f64,
    media_y_top: f64,
}

impl PageBounds {
    /// Matrix mapping PDF user space (y up, media box origin) to page
    /// space (y down, top-left origin).
    pub(crate) fn base_ctm(&self) -> Ctm {
        Ctm::new(1.0, 0.0, 0.0, -1.0, -self.media_x0, self.media_y_top)
    }
}

impl SnipDocument {
    /// Open a document from a file on disk.
    pub fn open<P: AsRef<FilePath>>(path: P) -> Result<Self, BackendError> {
        Self::from_document(Document::load(path)?)
    }

    /// Open a document from bytes already in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BackendError> {
        Self::from_document(Document::load_mem(bytes)?)
    }

    fn from_document(doc: Document) -> Result<Self, BackendError> {
        if doc.is_encrypted() {
            return Err(BackendError::Encrypted);
        }
        let page_ids = doc.get_pages().into_values().collect();
        Ok(Self { doc, page_ids })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub(crate) fn inner(&self) -> &Document {
        &self.doc
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(BackendError::PageNotFound(index))
    }

    /// Read the media box and rotation for a zero-based page index.
    pub fn page_bounds(&self, index: usize) -> Result<PageBounds, BackendError> {
        let page_id = self.page_id(index)?;
        let media_box = self
            .inherited_attr(page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| box_values(&self.doc, arr))
            .ok_or_else(|| {
                BackendError::Parse("MediaBox not found on page or ancestors".into())
            })?;
        let [x0, y0, x1, y1] = media_box;
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));

        let rotation = self
            .inherited_attr(page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(|r| (r.rem_euclid(360)) as u16)
            .filter(|r| r % 90 == 0)
            .unwrap_or(0);

        Ok(PageBounds {
            width: x1 - x0,
            height: y1 - y0,
            rotation,
            media_x0: x0,
            media_y_top: y1,
        })
    }

    /// The page's resource dictionary, walking up the page tree when the
    /// page itself carries none. Pages without resources get an empty
    /// dictionary.
    pub(crate) fn page_resources(&self, index: usize) -> Result<&Dictionary, BackendError> {
        let page_id = self.page_id(index)?;
        Ok(self
            .inherited_attr(page_id, b"Resources")
            .and_then(|obj| obj.as_dict().ok())
            .unwrap_or(&EMPTY_RESOURCES))
    }

    /// The decoded content stream bytes for a page.
    ///
    /// Multiple content streams are concatenated with a separating space,
    /// as they form a single stream for parsing purposes.
    pub(crate) fn page_content(&self, index: usize) -> Result<Vec<u8>, BackendError> {
        let page_id = self.page_id(index)?;
        let page_dict = self
            .doc
            .get_object(page_id)
            .ok()
            .and_then(|obj| obj.as_dict().ok())
            .ok_or_else(|| BackendError::Parse(format!("page {index} is not a dictionary")))?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };
        let mut bytes = Vec::new();
        match resolve(&self.doc, contents) {
            Object::Stream(stream) => bytes = stream_bytes(stream),
            Object::Array(parts) => {
                for part in parts {
                    if let Object::Stream(stream) = resolve(&self.doc, part) {
                        if !bytes.is_empty() {
                            bytes.push(b' ');
                        }
                        bytes.extend_from_slice(&stream_bytes(stream));
                    }
                }
            }
            _ => {}
        }
        Ok(bytes)
    }

    /// Look up a page attribute, walking /Parent for inheritable keys.
    fn inherited_attr(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = page_id;
        for _ in 0..MAX_CHAIN {
            let dict = self.doc.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(obj) = dict.get(key) {
                return Some(resolve(&self.doc, obj));
            }
            current = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }
}

/// Follow reference chains to the target object. Unresolvable or cyclic
/// chains return the last object reached.
pub(crate) fn resolve<'a>(doc: &'a Document, mut obj: &'a Object) -> &'a Object {
    let mut hops = 0;
    while let Object::Reference(id) = obj {
        match doc.get_object(*id) {
            Ok(next) if hops < MAX_CHAIN => {
                obj = next;
                hops += 1;
            }
            _ => break,
        }
    }
    obj
}

/// Numeric value of an Integer or Real object.
pub(crate) fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Decoded name string of a Name object.
pub(crate) fn name_string(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Stream content with filters applied. Falls back to the raw bytes when
/// a filter is unsupported.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

fn box_values(doc: &Document, array: &[Object]) -> Option<[f64; 4]> {
    if array.len() != 4 {
        return None;
    }
    Some([
        object_to_f64(resolve(doc, &array[0]))?,
        object_to_f64(resolve(doc, &array[1]))?,
        object_to_f64(resolve(doc, &array[2]))?,
        object_to_f64(resolve(doc, &array[3]))?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    /// Minimal one-page document with the given content stream and an
    /// optional extra entry on the page dictionary.
    fn single_page_doc(content: &[u8], extra: Option<(&str, Object)>) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Object::Stream(Stream::new(
            dictionary! {},
            content.to_vec(),
        )));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        };
        if let Some((key, value)) = extra {
            page.set(key, value);
        }
        let page_id = doc.add_object(Object::Dictionary(page));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        }));
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn roundtrip(mut doc: Document) -> Vec<u8> {
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("in-memory save");
        bytes
    }

    // --- open ---

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = SnipDocument::from_bytes(b"not a pdf").unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[test]
    fn test_page_count() {
        let bytes = roundtrip(single_page_doc(b"", None));
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        assert_eq!(doc.page_count(), 1);
    }

    // --- bounds ---

    #[test]
    fn test_page_bounds_from_inherited_media_box() {
        let bytes = roundtrip(single_page_doc(b"", None));
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        let bounds = doc.page_bounds(0).expect("bounds");
        assert_eq!(bounds.width, 612.0);
        assert_eq!(bounds.height, 792.0);
        assert_eq!(bounds.rotation, 0);
    }

    #[test]
    fn test_page_bounds_rotation() {
        let bytes = roundtrip(single_page_doc(b"", Some(("Rotate", 90.into()))));
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        assert_eq!(doc.page_bounds(0).expect("bounds").rotation, 90);
    }

    #[test]
    fn test_page_bounds_negative_rotation_normalizes() {
        let bytes = roundtrip(single_page_doc(b"", Some(("Rotate", Object::Integer(-90)))));
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        assert_eq!(doc.page_bounds(0).expect("bounds").rotation, 270);
    }

    #[test]
    fn test_page_bounds_out_of_range_index() {
        let bytes = roundtrip(single_page_doc(b"", None));
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        let err = doc.page_bounds(3).unwrap_err();
        assert!(matches!(err, BackendError::PageNotFound(3)));
    }

    #[test]
    fn test_base_ctm_flips_y() {
        let bytes = roundtrip(single_page_doc(b"", None));
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        let bounds = doc.page_bounds(0).expect("bounds");
        let m = bounds.base_ctm();

        // PDF origin (bottom-left) lands at the page's bottom-left in
        // y-down coordinates.
        let p = m.transform_point(pdfsnip_core::Point::new(0.0, 0.0));
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 792.0);
        let top = m.transform_point(pdfsnip_core::Point::new(0.0, 792.0));
        assert_eq!(top.y, 0.0);
    }

    // --- content ---

    #[test]
    fn test_page_content_bytes() {
        let bytes = roundtrip(single_page_doc(b"0 0 10 10 re f", None));
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        assert_eq!(doc.page_content(0).expect("content"), b"0 0 10 10 re f");
    }

    #[test]
    fn test_page_content_joins_multiple_streams() {
        let mut doc = single_page_doc(b"", None);
        let first = doc.add_object(Object::Stream(Stream::new(dictionary! {}, b"q".to_vec())));
        let second = doc.add_object(Object::Stream(Stream::new(dictionary! {}, b"Q".to_vec())));
        let page_id = doc.get_pages()[&1];
        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            page.set(
                "Contents",
                vec![Object::Reference(first), Object::Reference(second)],
            );
        }
        let bytes = roundtrip(doc);
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        assert_eq!(doc.page_content(0).expect("content"), b"q Q");
    }

    // --- resources ---

    #[test]
    fn test_missing_resources_yields_empty_dictionary() {
        let bytes = roundtrip(single_page_doc(b"", None));
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        assert!(doc.page_resources(0).expect("resources").is_empty());
    }

    #[test]
    fn test_page_resources_found_on_page() {
        let resources = dictionary! {
            "Font" => Object::Dictionary(dictionary! {}),
        };
        let bytes = roundtrip(single_page_doc(
            b"",
            Some(("Resources", Object::Dictionary(resources))),
        ));
        let doc = SnipDocument::from_bytes(&bytes).expect("open");
        assert!(doc.page_resources(0).expect("resources").has(b"Font"));
    }

    // --- helpers ---

    #[test]
    fn test_object_to_f64() {
        assert_eq!(object_to_f64(&Object::Integer(3)), Some(3.0));
        assert_eq!(object_to_f64(&Object::Real(1.5)), Some(1.5));
        assert_eq!(object_to_f64(&Object::Null), None);
    }

    #[test]
    fn test_name_string() {
        assert_eq!(
            name_string(&Object::Name(b"DeviceRGB".to_vec())),
            Some("DeviceRGB".to_string())
        );
        assert_eq!(name_string(&Object::Integer(1)), None);
    }
}
