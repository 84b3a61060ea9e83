//! Loaded PDF documents

use crate::error::SignError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The only media type accepted for upload
pub const PDF_MIME: &str = "application/pdf";

/// US Letter, used when no MediaBox is found anywhere in the page tree
pub const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page tree depth limit when walking `Parent` links
const MAX_INHERIT_DEPTH: usize = 32;

/// Page dimensions in PDF points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// The currently loaded PDF: original bytes plus the page geometry needed for
/// placing annotations
#[derive(Debug, Clone)]
pub struct DocumentSession {
    id: String,
    bytes: Vec<u8>,
    page_sizes: Vec<PageSize>,
}

impl DocumentSession {
    /// Accept an uploaded file. Anything that is not declared as a PDF is
    /// rejected before parsing.
    pub fn load(mime: &str, bytes: Vec<u8>) -> Result<Self, SignError> {
        if mime != PDF_MIME {
            return Err(SignError::UnsupportedMediaType(mime.to_string()));
        }
        Self::from_bytes(bytes)
    }

    /// Parse PDF bytes without a media type check
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SignError> {
        if !bytes.starts_with(b"%PDF-") {
            return Err(SignError::Parse("Not a PDF file (missing %PDF- header)".into()));
        }

        let doc = Document::load_mem(&bytes).map_err(|e| SignError::Parse(e.to_string()))?;
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(SignError::NoPages);
        }

        let page_sizes = pages
            .values()
            .map(|&page_id| {
                let [_, _, width, height] = page_media_box(&doc, page_id);
                PageSize { width, height }
            })
            .collect::<Vec<_>>();

        let id = uuid::Uuid::new_v4().to_string();
        info!(session = %id, pages = page_sizes.len(), bytes = bytes.len(), "document loaded");

        Ok(Self {
            id,
            bytes,
            page_sizes,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    pub fn page_sizes(&self) -> &[PageSize] {
        &self.page_sizes
    }

    /// Size of a 1-based page
    pub fn page_size(&self, page_number: u32) -> Option<PageSize> {
        let index = page_number.checked_sub(1)? as usize;
        self.page_sizes.get(index).copied()
    }
}

/// Find an attribute on a page dictionary, following `Parent` links for
/// inheritable keys.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent_id = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_object(parent_id).ok()?.as_dict().ok()?;
    }
    None
}

/// Resolve a possibly indirect dictionary
pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        _ => None,
    }
}

/// MediaBox of a page as `[x, y, width, height]`
pub(crate) fn page_media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    match inherited_attribute(doc, page_id, b"MediaBox").and_then(|obj| parse_rect(doc, obj)) {
        Some(rect) => rect,
        None => {
            debug!(?page_id, "no usable MediaBox, assuming US Letter");
            DEFAULT_MEDIA_BOX
        }
    }
}

fn parse_rect(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let arr = match obj {
        Object::Array(a) => a,
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
        _ => return None,
    };
    if arr.len() != 4 {
        return None;
    }

    let mut values = [0.0f64; 4];
    for (slot, obj) in values.iter_mut().zip(arr) {
        *slot = extract_number(doc, obj)?;
    }

    // [x1, y1, x2, y2] -> [x, y, width, height]
    Some([
        values[0],
        values[1],
        values[2] - values[0],
        values[3] - values[1],
    ])
}

fn extract_number(doc: &Document, obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        Object::Reference(id) => extract_number(doc, doc.get_object(*id).ok()?),
        _ => None,
    }
}
