//! Signing workspace: the state every UI event handler calls into
//!
//! Holds the loaded document, the placed annotations and, while the signature
//! dialog is open, the drop target the drawn signature will be placed at.

use crate::annotation::{Annotation, AnnotationId, AnnotationKind, AnnotationStore, PlacementDefaults};
use crate::capture::CaptureOutcome;
use crate::config::SignerConfig;
use crate::coords::{locate_drop, DropTarget, PageBox, ScreenPoint};
use crate::document::DocumentSession;
use crate::drag::{DragPayload, NewAnnotationKind};
use crate::error::SignError;
use crate::export::{export_document, ExportOptions};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// File name offered for the exported PDF
pub const DOWNLOAD_NAME: &str = "signed-document.pdf";

/// What a drop did to the workspace
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    /// Nothing changed: no document, pointer outside every page, or unknown id
    Ignored,
    Created { id: AnnotationId },
    Moved { id: AnnotationId },
    /// A drawn signature was requested; the capture dialog should open and
    /// its result be passed to [`Workspace::complete_capture`]
    CaptureRequested { target: DropTarget },
}

#[derive(Debug, Default)]
pub struct Workspace {
    config: SignerConfig,
    document: Option<DocumentSession>,
    annotations: AnnotationStore,
    pending_capture: Option<DropTarget>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SignerConfig) -> Self {
        let annotations = AnnotationStore::with_defaults(PlacementDefaults::from(&config));
        Self {
            config,
            annotations,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&DocumentSession> {
        self.document.as_ref()
    }

    /// Replace the current document.
    ///
    /// On failure nothing changes. On success all annotations and any pending
    /// capture belong to the old document and are dropped.
    pub fn load_document(&mut self, mime: &str, bytes: Vec<u8>) -> Result<&DocumentSession, SignError> {
        let session = match DocumentSession::load(mime, bytes) {
            Ok(session) => session,
            Err(e) => {
                warn!(mime, error = %e, "upload rejected");
                return Err(e);
            }
        };

        let dropped = self.annotations.len();
        self.annotations.clear();
        self.pending_capture = None;
        if dropped > 0 {
            debug!(dropped, "cleared annotations from previous document");
        }

        Ok(self.document.insert(session))
    }

    /// Apply a drop of `payload` at `point`, given the on-screen boxes of the
    /// rendered pages in page order
    pub fn handle_drop(&mut self, payload: &DragPayload, point: ScreenPoint, pages: &[PageBox]) -> DropOutcome {
        let Some(document) = &self.document else {
            debug!("drop ignored: no document loaded");
            return DropOutcome::Ignored;
        };

        let target = match locate_drop(point, pages) {
            Some(target) if target.page_number <= document.page_count() => target,
            _ => {
                debug!(x = point.x, y = point.y, "drop ignored: outside pages");
                return DropOutcome::Ignored;
            }
        };

        match payload {
            DragPayload::NewSignature { kind, text } => {
                let kind = match kind {
                    NewAnnotationKind::Drawn => {
                        self.pending_capture = Some(target);
                        return DropOutcome::CaptureRequested { target };
                    }
                    NewAnnotationKind::Placeholder => AnnotationKind::Placeholder {
                        label: self.config.placeholder_label.clone(),
                    },
                    NewAnnotationKind::Text => AnnotationKind::Text {
                        text: text.clone().unwrap_or_default(),
                        font_size: self.config.text_font_size,
                    },
                };
                let id = self.place(target, kind);
                DropOutcome::Created { id }
            }
            DragPayload::ExistingAnnotation { id } => {
                if self
                    .annotations
                    .move_or_retarget(*id, target.page_number, target.x, target.y)
                {
                    debug!(%id, page = target.page_number, "annotation moved");
                    DropOutcome::Moved { id: *id }
                } else {
                    debug!(%id, "drop ignored: unknown annotation");
                    DropOutcome::Ignored
                }
            }
        }
    }

    fn place(&mut self, target: DropTarget, kind: AnnotationKind) -> AnnotationId {
        let id = self
            .annotations
            .add(target.page_number, target.x, target.y, kind, None);
        debug!(%id, page = target.page_number, x = target.x, y = target.y, "annotation placed");
        id
    }

    /// Drop target waiting for the signature dialog, if one is open
    pub fn pending_capture(&self) -> Option<DropTarget> {
        self.pending_capture
    }

    /// Finish the signature dialog opened by a drawn-signature drop
    pub fn complete_capture(&mut self, outcome: CaptureOutcome) -> Option<AnnotationId> {
        let target = self.pending_capture.take()?;
        match outcome {
            CaptureOutcome::Saved(image) => Some(self.place(
                target,
                AnnotationKind::DrawnImage { image, dated: true },
            )),
            CaptureOutcome::Cancelled => {
                debug!("signature capture cancelled");
                None
            }
        }
    }

    pub fn resize(&mut self, id: AnnotationId, width: f64, height: f64) -> bool {
        self.annotations.resize(id, width, height)
    }

    pub fn remove(&mut self, id: AnnotationId) -> bool {
        self.annotations.remove(id)
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn annotations_for_page(&self, page_number: u32) -> Vec<&Annotation> {
        self.annotations.by_page(page_number)
    }

    /// Export needs a document and at least one annotation
    pub fn can_export(&self) -> bool {
        self.document.is_some() && !self.annotations.is_empty()
    }

    /// Export with today's date
    pub fn export(&self) -> Result<Vec<u8>, SignError> {
        self.export_with(&ExportOptions::new(self.config.clone()))
    }

    pub fn export_with(&self, options: &ExportOptions) -> Result<Vec<u8>, SignError> {
        let document = match &self.document {
            Some(document) if !self.annotations.is_empty() => document,
            _ => return Err(SignError::ExportDisabled),
        };
        let bytes = export_document(document.bytes(), self.annotations.annotations(), options)?;
        info!(session = document.id(), bytes = bytes.len(), "signed document ready");
        Ok(bytes)
    }

    /// Export for the download button: failures are logged, never raised, and
    /// simply produce no file
    pub fn export_for_download(&self) -> Option<Vec<u8>> {
        if !self.can_export() {
            return None;
        }
        match self.export() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!(error = %e, "export failed");
                None
            }
        }
    }
}
