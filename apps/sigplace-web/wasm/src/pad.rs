//! Signature capture surface for the draw-your-signature dialog

use sigplace_core::{PadConfig, SignaturePad};
use wasm_bindgen::prelude::*;

/// Free-hand drawing surface. The dialog forwards pointer events in canvas
/// pixel coordinates and paints `pixels()` into an `ImageData`.
#[wasm_bindgen(js_name = SignaturePad)]
pub struct SignaturePadHandle {
    pad: SignaturePad,
}

impl Default for SignaturePadHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(js_class = SignaturePad)]
impl SignaturePadHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            pad: SignaturePad::default(),
        }
    }

    /// Create a pad from a JSON `PadConfig` (width, height, stroke_width, stroke_color)
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<SignaturePadHandle, JsValue> {
        let config: PadConfig = serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid pad config: {}", e)))?;
        Ok(Self {
            pad: SignaturePad::new(&config),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.pad.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.pad.height()
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.pad.pointer_down(x, y);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.pad.pointer_move(x, y);
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.pad.pointer_up();
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.pad.pointer_leave();
    }

    pub fn clear(&mut self) {
        self.pad.clear();
    }

    #[wasm_bindgen(js_name = isBlank)]
    pub fn is_blank(&self) -> bool {
        self.pad.is_blank()
    }

    /// RGBA bytes of the current bitmap
    pub fn pixels(&self) -> Vec<u8> {
        self.pad.pixels().to_vec()
    }

    /// PNG data URL for the dialog's `onSave`
    pub fn save(&self) -> Result<String, JsValue> {
        self.pad
            .save()
            .map(|image| image.to_data_url())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
