//! Drag-and-drop signature placement on PDF documents
//!
//! Load a PDF, drop signature placeholders, drawn signatures or text onto its
//! pages, and export a new PDF with everything burned into the page content.
//!
//! - `Workspace`: the state machine UI event handlers call into
//! - `locate_drop`: maps a screen-space drop onto a page-relative offset
//! - `AnnotationStore`: placed annotations, addressed by `AnnotationId`
//! - `export_document`: draws annotations into a copy of the PDF with lopdf
//! - `SignaturePad`: raster surface for free-hand signatures

pub mod annotation;
pub mod capture;
pub mod config;
pub mod coords;
pub mod document;
pub mod drag;
pub mod error;
pub mod export;
pub mod workspace;

pub use annotation::{
    Annotation, AnnotationId, AnnotationKind, AnnotationStore, PlacementDefaults, MAX_ANNOTATION_ID,
};
pub use capture::{CaptureOutcome, SignatureImage, SignaturePad};
pub use config::{PadConfig, SignerConfig, Size, SizeBounds};
pub use coords::{locate_drop, DropTarget, PageBox, ScreenPoint};
pub use document::{DocumentSession, PageSize, PDF_MIME};
pub use drag::{DragPayload, NewAnnotationKind};
pub use error::SignError;
pub use export::{export_document, ExportOptions};
pub use workspace::{DropOutcome, Workspace, DOWNLOAD_NAME};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, SignError> {
    DocumentSession::from_bytes(bytes.to_vec()).map(|session| session.page_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_page_count() {
        assert_eq!(get_page_count(&document::test_pdf::letter(3)).unwrap(), 3);
        assert!(get_page_count(b"not a pdf").is_err());
    }
}
