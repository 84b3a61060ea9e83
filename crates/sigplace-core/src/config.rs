//! Signer configuration
//!
//! Every field has a default, so an empty TOML or JSON document is a valid
//! configuration. Sizes are in UI pixels, which map 1:1 to PDF points at the
//! renderer's default scale.

use crate::error::SignError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Width and height of an annotation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Minimum and maximum annotation size enforced on resize
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SizeBounds {
    pub min: Size,
    pub max: Size,
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self {
            min: Size::new(100.0, 40.0),
            max: Size::new(400.0, 200.0),
        }
    }
}

impl SizeBounds {
    /// Clamp a requested size into the bounds.
    ///
    /// Non-finite input collapses to the minimum.
    pub fn clamp(&self, width: f64, height: f64) -> Size {
        let clamp_axis = |v: f64, lo: f64, hi: f64| {
            if v.is_finite() {
                v.clamp(lo, hi.max(lo))
            } else {
                lo
            }
        };
        Size {
            width: clamp_axis(width, self.min.width, self.max.width),
            height: clamp_axis(height, self.min.height, self.max.height),
        }
    }
}

/// Shortest dash the placeholder border may use, in points
pub const MIN_DASH_LENGTH: f64 = 0.1;

/// Largest pad side, in pixels
pub const MAX_PAD_DIMENSION: u32 = 4096;

/// Free-hand drawing surface settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PadConfig {
    pub width: u32,
    pub height: u32,
    pub stroke_width: f64,
    /// Stroke color as `#RRGGBB`
    pub stroke_color: String,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 200,
            stroke_width: 2.0,
            stroke_color: "#000000".to_string(),
        }
    }
}

/// Configuration for annotation placement and export rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignerConfig {
    pub placeholder_size: Size,
    /// Drawn signatures are placed at their bitmap size times this factor
    pub image_scale: f64,
    pub text_size: Size,
    pub size_bounds: SizeBounds,
    pub dash_length: f64,
    pub dash_gap: f64,
    pub border_width: f64,
    /// Opacity of the placeholder border and label (0-1)
    pub ink_opacity: f64,
    pub placeholder_label: String,
    pub label_font_size: f64,
    pub text_font_size: f64,
    pub date_font_size: f64,
    /// Distance between the bottom of a drawn signature and the date baseline
    pub date_offset: f64,
    /// chrono format string for the date stamp
    pub date_format: String,
    pub pad: PadConfig,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            placeholder_size: Size::new(220.0, 40.0),
            image_scale: 0.5,
            text_size: Size::new(160.0, 40.0),
            size_bounds: SizeBounds::default(),
            dash_length: 4.0,
            dash_gap: 2.0,
            border_width: 1.0,
            ink_opacity: 0.6,
            placeholder_label: "Signature here".to_string(),
            label_font_size: 12.0,
            text_font_size: 12.0,
            date_font_size: 10.0,
            date_offset: 20.0,
            date_format: "%m/%d/%Y".to_string(),
            pad: PadConfig::default(),
        }
    }
}

impl SignerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SignError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SignError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self, SignError> {
        let config: Self = toml::from_str(s).map_err(|e| SignError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(s: &str) -> Result<Self, SignError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| SignError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the exporter cannot draw with
    pub fn validate(&self) -> Result<(), SignError> {
        if !self.dash_length.is_finite()
            || self.dash_length < MIN_DASH_LENGTH
            || !self.dash_gap.is_finite()
            || self.dash_gap < 0.0
        {
            return Err(SignError::Config(format!(
                "dash_length must be >= {} and dash_gap >= 0 (got {} / {})",
                MIN_DASH_LENGTH, self.dash_length, self.dash_gap
            )));
        }
        let SizeBounds { min, max } = self.size_bounds;
        if min.width <= 0.0 || min.height <= 0.0 || max.width < min.width || max.height < min.height
        {
            return Err(SignError::Config(
                "size_bounds must satisfy 0 < min <= max".to_string(),
            ));
        }
        if self.image_scale.is_nan() || self.image_scale <= 0.0 {
            return Err(SignError::Config(format!(
                "image_scale must be > 0 (got {})",
                self.image_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.ink_opacity) {
            return Err(SignError::Config(format!(
                "ink_opacity must be within 0-1 (got {})",
                self.ink_opacity
            )));
        }
        let sides = 1..=MAX_PAD_DIMENSION;
        if !sides.contains(&self.pad.width) || !sides.contains(&self.pad.height) {
            return Err(SignError::Config(format!(
                "pad dimensions must be within 1-{} (got {}x{})",
                MAX_PAD_DIMENSION, self.pad.width, self.pad.height
            )));
        }
        Ok(())
    }
}

/// Parse hex color string (e.g., "#FF0000" or "FF0000") to RGB bytes
pub fn parse_hex_color(color: &str) -> [u8; 3] {
    let hex = color.trim_start_matches('#');
    if hex.len() >= 6 {
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .unwrap_or(0)
        };
        [channel(0..2), channel(2..4), channel(4..6)]
    } else {
        [0, 0, 0]
    }
}
