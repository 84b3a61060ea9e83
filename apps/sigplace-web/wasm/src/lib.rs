//! WASM bindings for drag-and-drop PDF signing
//!
//! All state lives in Rust. JavaScript renders pages with PDF.js, reports
//! DOM measurements and forwards events.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { SigningWorkspace, SignaturePad } from './pkg/sigplace_wasm.js';
//!
//! await init();
//! const ws = new SigningWorkspace();
//! const pages = ws.loadDocument(file.type, new Uint8Array(await file.arrayBuffer()));
//!
//! // on drop
//! const rects = pageElements.flatMap(el => {
//!   const r = el.getBoundingClientRect();
//!   return [r.top, r.left, r.bottom, r.right];
//! });
//! const result = ws.handleDrop(e.dataTransfer.getData('application/json'),
//!                              e.clientX, e.clientY, new Float64Array(rects));
//! if (result.outcome === 'capture_requested') openSignatureDialog();
//!
//! // signature dialog
//! const pad = new SignaturePad();
//! // ... pointer events -> pad.pointerDown / pointerMove / pointerUp
//! ws.completeCapture(pad.save());
//!
//! exportButton.disabled = !ws.canExport;
//! ws.exportAndDownload();
//! ```

pub mod download;
pub mod layout;
pub mod pad;
pub mod session;

use wasm_bindgen::prelude::*;

pub use pad::SignaturePadHandle;
pub use session::SigningWorkspace;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"SigPlace WASM initialized".into());
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Page count of a PDF, for showing file info before loading it
#[wasm_bindgen]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    sigplace_core::get_page_count(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}
