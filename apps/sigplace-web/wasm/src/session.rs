//! Session object owned by the page script
//!
//! Every UI callback (file input change, drop, resize handle, delete button,
//! export button) calls one method here. Failures that the UI only needs to
//! know about, not handle, are kept in `lastError` instead of being thrown.

use crate::download::trigger_download;
use crate::layout::page_boxes_from_flat;
use sigplace_core::{
    AnnotationId, CaptureOutcome, DragPayload, ScreenPoint, SignError, SignatureImage,
    SignerConfig, Workspace, DOWNLOAD_NAME, PDF_MIME,
};
use wasm_bindgen::prelude::*;
use web_sys::console;

#[wasm_bindgen]
pub struct SigningWorkspace {
    workspace: Workspace,
    last_error: Option<String>,
}

impl Default for SigningWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[wasm_bindgen]
impl SigningWorkspace {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            last_error: None,
        }
    }

    /// Create a workspace from a JSON `SignerConfig`; missing fields use defaults
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<SigningWorkspace, JsValue> {
        let config = SignerConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            workspace: Workspace::with_config(config),
            last_error: None,
        })
    }

    /// Message of the most recent failure, if any
    #[wasm_bindgen(getter, js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }

    fn record(&mut self, error: &SignError) -> JsValue {
        let message = error.user_message();
        console::warn_1(&JsValue::from_str(&message));
        self.last_error = Some(message.clone());
        JsValue::from_str(&message)
    }

    /// Load an uploaded file. Returns the page count; rejects non-PDF uploads
    /// with "Please upload a valid PDF file."
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, mime: &str, bytes: &[u8]) -> Result<u32, JsValue> {
        match self.workspace.load_document(mime, bytes.to_vec()) {
            Ok(session) => {
                let pages = session.page_count();
                self.last_error = None;
                Ok(pages)
            }
            Err(e) => Err(self.record(&e)),
        }
    }

    #[wasm_bindgen(getter, js_name = hasDocument)]
    pub fn has_document(&self) -> bool {
        self.workspace.document().is_some()
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.workspace.document().map_or(0, |d| d.page_count())
    }

    /// Original document bytes for PDF.js rendering
    #[wasm_bindgen(js_name = getDocumentBytes)]
    pub fn get_document_bytes(&self) -> Option<js_sys::Uint8Array> {
        self.workspace
            .document()
            .map(|d| js_sys::Uint8Array::from(d.bytes()))
    }

    /// Page sizes in PDF points as `[{ width, height }, ...]`
    #[wasm_bindgen(js_name = getPageSizes)]
    pub fn get_page_sizes(&self) -> Result<JsValue, JsValue> {
        let sizes = self
            .workspace
            .document()
            .map(|d| d.page_sizes().to_vec())
            .unwrap_or_default();
        to_js(&sizes)
    }

    /// Handle a drop on the page container.
    ///
    /// `payload` is the JSON drag payload, `(client_x, client_y)` the pointer
    /// position and `page_rects` the flat `[top, left, bottom, right, ...]`
    /// bounding boxes of the rendered pages. Returns the outcome object, e.g.
    /// `{ outcome: "created", id }` or `{ outcome: "capture_requested", target }`.
    #[wasm_bindgen(js_name = handleDrop)]
    pub fn handle_drop(
        &mut self,
        payload: &str,
        client_x: f64,
        client_y: f64,
        page_rects: &[f64],
    ) -> Result<JsValue, JsValue> {
        let payload = DragPayload::from_json(payload)
            .map_err(|e| JsValue::from_str(&format!("Invalid drag payload: {}", e)))?;
        let pages = page_boxes_from_flat(page_rects).map_err(|e| JsValue::from_str(&e))?;

        let outcome = self
            .workspace
            .handle_drop(&payload, ScreenPoint::new(client_x, client_y), &pages);
        to_js(&outcome)
    }

    /// Finish the signature dialog with the saved PNG data URL. Returns the new
    /// annotation id, or `undefined` when no drop was waiting.
    #[wasm_bindgen(js_name = completeCapture)]
    pub fn complete_capture(&mut self, data_url: &str) -> Result<Option<u64>, JsValue> {
        let image = SignatureImage::from_data_url(data_url).map_err(|e| self.record(&e))?;
        Ok(self
            .workspace
            .complete_capture(CaptureOutcome::Saved(image))
            .map(|id| id.0))
    }

    #[wasm_bindgen(js_name = cancelCapture)]
    pub fn cancel_capture(&mut self) {
        self.workspace.complete_capture(CaptureOutcome::Cancelled);
    }

    /// Resize from the overlay's resize handle; the size is clamped
    pub fn resize(&mut self, id: u64, width: f64, height: f64) -> bool {
        self.workspace.resize(AnnotationId(id), width, height)
    }

    pub fn remove(&mut self, id: u64) -> bool {
        self.workspace.remove(AnnotationId(id))
    }

    /// Annotations to render on one page, in stacking order
    #[wasm_bindgen(js_name = annotationsForPage)]
    pub fn annotations_for_page(&self, page_number: u32) -> Result<JsValue, JsValue> {
        to_js(&self.workspace.annotations_for_page(page_number))
    }

    /// Enables the export button
    #[wasm_bindgen(getter, js_name = canExport)]
    pub fn can_export(&self) -> bool {
        self.workspace.can_export()
    }

    /// Signed PDF bytes
    pub fn export(&mut self) -> Result<Vec<u8>, JsValue> {
        self.workspace.export().map_err(|e| self.record(&e))
    }

    /// Export and download as `signed-document.pdf`. Returns whether a file
    /// was produced; failures are logged and reported through `lastError`.
    #[wasm_bindgen(js_name = exportAndDownload)]
    pub fn export_and_download(&mut self) -> bool {
        let Some(bytes) = self.workspace.export_for_download() else {
            if self.workspace.can_export() {
                self.last_error = Some("Export failed".to_string());
            }
            console::error_1(&"Export produced no file".into());
            return false;
        };

        match trigger_download(&bytes, DOWNLOAD_NAME, PDF_MIME) {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(e) => {
                console::error_2(&"Download failed:".into(), &e);
                self.last_error = Some("Download failed".to_string());
                false
            }
        }
    }
}
