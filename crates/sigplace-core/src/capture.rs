//! Free-hand signature capture
//!
//! `SignaturePad` is a raster drawing surface driven by pointer events. Each
//! pointer move while a stroke is active draws a straight segment from the
//! previous point, so a stroke becomes a polyline approximation of the pen
//! path. The pad keeps only the current bitmap; there is no stroke history.

use crate::config::{parse_hex_color, PadConfig, MAX_PAD_DIMENSION};
use crate::error::SignError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const DATA_URL_PREFIX: &str = "data:image/png;base64,";
const WHITE: [u8; 4] = [255, 255, 255, 255];

/// A validated PNG signature bitmap.
///
/// Serializes as a `data:image/png;base64,...` URL, the same form a canvas
/// `toDataURL()` produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignatureImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

/// Decoded 8-bit RGBA pixels of a signature image
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaPixels {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl SignatureImage {
    /// Wrap PNG bytes, checking the signature and reading the dimensions
    pub fn from_png(bytes: Vec<u8>) -> Result<Self, SignError> {
        if bytes.len() < PNG_MAGIC.len() || !bytes.starts_with(&PNG_MAGIC) {
            return Err(SignError::InvalidImage("Invalid PNG magic bytes".to_string()));
        }
        let decoder = png::Decoder::new(Cursor::new(bytes.as_slice()));
        let reader = decoder
            .read_info()
            .map_err(|e| SignError::InvalidImage(e.to_string()))?;
        let (width, height) = {
            let info = reader.info();
            (info.width, info.height)
        };
        if width == 0 || height == 0 {
            return Err(SignError::InvalidImage("Image has no pixels".to_string()));
        }
        Ok(Self {
            png: bytes,
            width,
            height,
        })
    }

    /// Parse a `data:image/png;base64,` URL
    pub fn from_data_url(url: &str) -> Result<Self, SignError> {
        let encoded = url.trim().strip_prefix(DATA_URL_PREFIX).ok_or_else(|| {
            SignError::InvalidImage("Expected a data:image/png;base64 URL".to_string())
        })?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| SignError::InvalidImage(format!("Invalid base64: {}", e)))?;
        Self::from_png(bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(&self.png))
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Decode to 8-bit RGBA regardless of the stored color type
    pub fn decode_rgba(&self) -> Result<RgbaPixels, SignError> {
        let mut decoder = png::Decoder::new(Cursor::new(self.png.as_slice()));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder
            .read_info()
            .map_err(|e| SignError::InvalidImage(e.to_string()))?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader
            .next_frame(&mut buf)
            .map_err(|e| SignError::InvalidImage(e.to_string()))?;
        buf.truncate(frame.buffer_size());

        let pixel_count = (frame.width as usize) * (frame.height as usize);
        let data = match frame.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
            png::ColorType::Indexed => {
                return Err(SignError::InvalidImage(
                    "Indexed PNG was not expanded".to_string(),
                ))
            }
        };
        if data.len() != pixel_count * 4 {
            return Err(SignError::InvalidImage(format!(
                "Decoded {} bytes for {}x{} pixels",
                data.len(),
                frame.width,
                frame.height
            )));
        }
        Ok(RgbaPixels {
            width: frame.width,
            height: frame.height,
            data,
        })
    }
}

impl TryFrom<String> for SignatureImage {
    type Error = SignError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_data_url(&value)
    }
}

impl From<SignatureImage> for String {
    fn from(image: SignatureImage) -> Self {
        image.to_data_url()
    }
}

/// Encode RGBA pixels as PNG
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, SignError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| SignError::Serialization(e.to_string()))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| SignError::Serialization(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| SignError::Serialization(e.to_string()))?;
    }
    Ok(out)
}

/// Result of the signature dialog, mirroring its `onSave` / `onCancel` callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Saved(SignatureImage),
    Cancelled,
}

/// Raster free-hand drawing surface
#[derive(Debug, Clone)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    ink: [u8; 4],
    stroke_width: f64,
    last_point: Option<(f64, f64)>,
}

impl SignaturePad {
    pub fn new(config: &PadConfig) -> Self {
        let [r, g, b] = parse_hex_color(&config.stroke_color);
        let width = config.width.clamp(1, MAX_PAD_DIMENSION);
        let height = config.height.clamp(1, MAX_PAD_DIMENSION);
        Self {
            width,
            height,
            pixels: blank_canvas(width, height),
            ink: [r, g, b, 255],
            stroke_width: config.stroke_width.max(1.0),
            last_point: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a stroke is in progress
    pub fn is_drawing(&self) -> bool {
        self.last_point.is_some()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.last_point = Some((x, y));
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some(from) = self.last_point {
            self.draw_segment(from, (x, y));
            self.last_point = Some((x, y));
        }
    }

    pub fn pointer_up(&mut self) {
        self.last_point = None;
    }

    /// Pointer left the surface; ends the stroke like `pointer_up`
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    /// Reset to an opaque white canvas
    pub fn clear(&mut self) {
        self.pixels = blank_canvas(self.width, self.height);
        self.last_point = None;
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p == WHITE.as_slice())
    }

    /// RGBA bytes, row-major, suitable for a canvas `ImageData`
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn to_png(&self) -> Result<Vec<u8>, SignError> {
        encode_png(self.width, self.height, &self.pixels)
    }

    /// Serialize the current bitmap for the host dialog's `onSave`
    pub fn save(&self) -> Result<SignatureImage, SignError> {
        SignatureImage::from_png(self.to_png()?)
    }

    /// Stamp every pixel whose center lies within `stroke_width / 2` of the segment
    fn draw_segment(&mut self, from: (f64, f64), to: (f64, f64)) {
        let radius = self.stroke_width / 2.0;
        let min_x = (from.0.min(to.0) - radius).floor().max(0.0);
        let max_x = (from.0.max(to.0) + radius).ceil().min(self.width as f64 - 1.0);
        let min_y = (from.1.min(to.1) - radius).floor().max(0.0);
        let max_y = (from.1.max(to.1) + radius).ceil().min(self.height as f64 - 1.0);
        if min_x > max_x || min_y > max_y {
            return;
        }

        for py in (min_y as u32)..=(max_y as u32) {
            for px in (min_x as u32)..=(max_x as u32) {
                let center = (px as f64 + 0.5, py as f64 + 0.5);
                if distance_to_segment(center, from, to) <= radius {
                    let offset = (py as usize * self.width as usize + px as usize) * 4;
                    self.pixels[offset..offset + 4].copy_from_slice(&self.ink);
                }
            }
        }
    }
}

impl Default for SignaturePad {
    fn default() -> Self {
        Self::new(&PadConfig::default())
    }
}

fn blank_canvas(width: u32, height: u32) -> Vec<u8> {
    WHITE.repeat((width as usize) * (height as usize))
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pad: &SignaturePad, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * pad.width() + x) * 4) as usize;
        let p = &pad.pixels()[offset..offset + 4];
        [p[0], p[1], p[2], p[3]]
    }

    #[test]
    fn test_new_pad_is_blank_white() {
        let pad = SignaturePad::default();
        assert_eq!(pad.width(), 400);
        assert_eq!(pad.height(), 200);
        assert!(pad.is_blank());
        assert_eq!(pixel(&pad, 0, 0), WHITE);
    }

    #[test]
    fn test_pad_size_is_capped() {
        let pad = SignaturePad::new(&PadConfig {
            width: 70_000,
            height: 0,
            ..PadConfig::default()
        });
        assert_eq!(pad.width(), MAX_PAD_DIMENSION);
        assert_eq!(pad.height(), 1);
        assert_eq!(pad.pixels().len(), MAX_PAD_DIMENSION as usize * 4);
    }

    #[test]
    fn test_stroke_in_far_corner_of_largest_pad() {
        let side = MAX_PAD_DIMENSION;
        let mut pad = SignaturePad::new(&PadConfig {
            width: side,
            height: side,
            ..PadConfig::default()
        });
        let far = side as f64 - 1.5;
        pad.pointer_down(far - 4.0, far);
        pad.pointer_move(far, far);
        pad.pointer_up();

        let offset = ((side - 2) as usize * side as usize + (side - 2) as usize) * 4;
        assert_eq!(&pad.pixels()[offset..offset + 4], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_move_without_down_draws_nothing() {
        let mut pad = SignaturePad::default();
        pad.pointer_move(10.0, 10.0);
        pad.pointer_move(50.0, 50.0);
        assert!(pad.is_blank());
    }

    #[test]
    fn test_stroke_draws_polyline() {
        let mut pad = SignaturePad::default();
        pad.pointer_down(10.0, 10.0);
        pad.pointer_move(10.0, 50.0);
        pad.pointer_move(60.0, 50.0);
        pad.pointer_up();

        assert!(!pad.is_blank());
        // On the vertical leg
        assert_eq!(pixel(&pad, 9, 30), [0, 0, 0, 255]);
        // On the horizontal leg
        assert_eq!(pixel(&pad, 35, 49), [0, 0, 0, 255]);
        // Well away from both legs
        assert_eq!(pixel(&pad, 40, 20), WHITE);
    }

    #[test]
    fn test_pointer_up_ends_stroke() {
        let mut pad = SignaturePad::default();
        pad.pointer_down(10.0, 10.0);
        pad.pointer_up();
        pad.pointer_move(100.0, 100.0);
        assert!(pad.is_blank());
        assert!(!pad.is_drawing());
    }

    #[test]
    fn test_pointer_leave_ends_stroke() {
        let mut pad = SignaturePad::default();
        pad.pointer_down(10.0, 10.0);
        pad.pointer_leave();
        assert!(!pad.is_drawing());
    }

    #[test]
    fn test_clear_restores_blank() {
        let mut pad = SignaturePad::default();
        let baseline = pad.to_png().unwrap();
        pad.pointer_down(10.0, 10.0);
        pad.pointer_move(60.0, 50.0);
        assert_ne!(pad.to_png().unwrap(), baseline);
        pad.clear();
        assert!(pad.is_blank());
        assert_eq!(pad.to_png().unwrap(), baseline);
    }

    #[test]
    fn test_segment_outside_canvas_is_clipped() {
        let mut pad = SignaturePad::default();
        pad.pointer_down(-50.0, -50.0);
        pad.pointer_move(-10.0, -10.0);
        assert!(pad.is_blank());
        pad.pointer_move(1000.0, 1000.0);
        assert!(!pad.is_blank());
    }

    #[test]
    fn test_stroke_color_from_config() {
        let mut pad = SignaturePad::new(&PadConfig {
            stroke_color: "#222222".to_string(),
            stroke_width: 4.0,
            ..PadConfig::default()
        });
        pad.pointer_down(20.0, 20.0);
        pad.pointer_move(80.0, 20.0);
        assert_eq!(pixel(&pad, 50, 20), [0x22, 0x22, 0x22, 255]);
    }

    #[test]
    fn test_save_roundtrips_through_data_url() {
        let mut pad = SignaturePad::default();
        pad.pointer_down(10.0, 10.0);
        pad.pointer_move(60.0, 50.0);
        let image = pad.save().unwrap();
        assert_eq!((image.width(), image.height()), (400, 200));

        let restored = SignatureImage::from_data_url(&image.to_data_url()).unwrap();
        assert_eq!(restored, image);

        let decoded = restored.decode_rgba().unwrap();
        assert_eq!(decoded.data, pad.pixels());
    }

    #[test]
    fn test_rejects_non_png() {
        let err = SignatureImage::from_png(b"GIF89a....".to_vec()).unwrap_err();
        assert!(matches!(err, SignError::InvalidImage(_)));
        assert!(SignatureImage::from_data_url("data:image/jpeg;base64,AAAA").is_err());
    }

    #[test]
    fn test_decodes_rgb_png() {
        let rgb = [10u8, 20, 30, 40, 50, 60];
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 2, 1);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&rgb).unwrap();
        }
        let image = SignatureImage::from_png(out).unwrap();
        let decoded = image.decode_rgba().unwrap();
        assert_eq!(decoded.data, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_serde_as_data_url() {
        let image = SignaturePad::default().save().unwrap();
        let json = serde_json::to_string(&image).unwrap();
        assert!(json.starts_with("\"data:image/png;base64,"));
        let back: SignatureImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, image);
    }
}
