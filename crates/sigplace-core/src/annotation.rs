//! Annotation store for placed signatures
//!
//! Annotations are value records addressed by an opaque id and kept in
//! insertion order, which is also their z-order when rendered or exported.
//! Geometry is in UI space: pixels, origin at the page's top-left corner.

use crate::capture::SignatureImage;
use crate::config::{SignerConfig, Size, SizeBounds};
use serde::{de, Deserialize, Serialize};
use std::collections::HashSet;

/// Largest id a loaded plan may carry. Ids reach JavaScript as numbers, so
/// they stay within the exactly representable integer range.
pub const MAX_ANNOTATION_ID: u64 = (1 << 53) - 1;

/// Opaque annotation identifier, unique for the lifetime of a store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Dashed rectangle with a centered label
    Placeholder { label: String },
    /// Free-hand signature bitmap, optionally stamped with the export date
    DrawnImage {
        image: SignatureImage,
        #[serde(default = "default_dated")]
        dated: bool,
    },
    Text { text: String, font_size: f64 },
}

fn default_dated() -> bool {
    true
}

impl AnnotationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Placeholder { .. } => "placeholder",
            AnnotationKind::DrawnImage { .. } => "drawn_image",
            AnnotationKind::Text { .. } => "text",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    /// 1-based page number
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

/// Sizes used when an annotation is added without an explicit size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementDefaults {
    pub placeholder: Size,
    pub text: Size,
    pub image_scale: f64,
    pub bounds: SizeBounds,
}

impl Default for PlacementDefaults {
    fn default() -> Self {
        Self::from(&SignerConfig::default())
    }
}

impl From<&SignerConfig> for PlacementDefaults {
    fn from(config: &SignerConfig) -> Self {
        Self {
            placeholder: config.placeholder_size,
            text: config.text_size,
            image_scale: config.image_scale,
            bounds: config.size_bounds,
        }
    }
}

impl PlacementDefaults {
    fn natural_size(&self, kind: &AnnotationKind) -> Size {
        match kind {
            AnnotationKind::Placeholder { .. } => self.placeholder,
            AnnotationKind::Text { .. } => self.text,
            AnnotationKind::DrawnImage { image, .. } => Size::new(
                image.width() as f64 * self.image_scale,
                image.height() as f64 * self.image_scale,
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationStore {
    next_id: u64,
    annotations: Vec<Annotation>,
    #[serde(skip)]
    defaults: PlacementDefaults,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: PlacementDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn defaults(&self) -> &PlacementDefaults {
        &self.defaults
    }

    /// Append an annotation and return its freshly generated id.
    ///
    /// Without an explicit `size` the kind's default size is used. Either way
    /// the size is clamped to the configured bounds.
    pub fn add(
        &mut self,
        page_number: u32,
        x: f64,
        y: f64,
        kind: AnnotationKind,
        size: Option<Size>,
    ) -> AnnotationId {
        let id = AnnotationId(self.next_id);
        self.next_id += 1;

        let requested = size.unwrap_or_else(|| self.defaults.natural_size(&kind));
        let Size { width, height } = self
            .defaults
            .bounds
            .clamp(requested.width, requested.height);

        self.annotations.push(Annotation {
            id,
            page_number,
            x,
            y,
            width,
            height,
            kind,
        });
        id
    }

    /// Move an annotation, possibly onto another page. Unknown ids are ignored.
    pub fn move_or_retarget(&mut self, id: AnnotationId, page_number: u32, x: f64, y: f64) -> bool {
        match self.get_mut(id) {
            Some(annotation) => {
                annotation.page_number = page_number;
                annotation.x = x;
                annotation.y = y;
                true
            }
            None => false,
        }
    }

    /// Resize within the configured bounds. Unknown ids are ignored.
    pub fn resize(&mut self, id: AnnotationId, width: f64, height: f64) -> bool {
        let size = self.defaults.bounds.clamp(width, height);
        match self.get_mut(id) {
            Some(annotation) => {
                annotation.width = size.width;
                annotation.height = size.height;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: AnnotationId) -> bool {
        if let Some(pos) = self.annotations.iter().position(|a| a.id == id) {
            self.annotations.remove(pos);
            true
        } else {
            false
        }
    }

    /// Drop every annotation. Ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.annotations.clear();
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    /// Annotations on one page, in insertion order
    pub fn by_page(&self, page_number: u32) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| a.page_number == page_number)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.annotations)
    }

    /// Rebuild a store from a JSON array of annotations, keeping their ids.
    /// Sizes are clamped to the bounds like any other placement.
    ///
    /// Ids must be unique and no larger than [`MAX_ANNOTATION_ID`].
    pub fn from_json(json: &str, defaults: PlacementDefaults) -> Result<Self, serde_json::Error> {
        let mut annotations: Vec<Annotation> = serde_json::from_str(json)?;

        let mut seen = HashSet::with_capacity(annotations.len());
        for annotation in &annotations {
            if annotation.id.0 > MAX_ANNOTATION_ID {
                return Err(de::Error::custom(format!(
                    "annotation id {} exceeds {}",
                    annotation.id, MAX_ANNOTATION_ID
                )));
            }
            if !seen.insert(annotation.id) {
                return Err(de::Error::custom(format!(
                    "duplicate annotation id {}",
                    annotation.id
                )));
            }
        }

        for annotation in &mut annotations {
            let size = defaults.bounds.clamp(annotation.width, annotation.height);
            annotation.width = size.width;
            annotation.height = size.height;
        }
        let next_id = seen.iter().map(|id| id.0 + 1).max().unwrap_or(0);
        Ok(Self {
            next_id,
            annotations,
            defaults,
        })
    }
}
