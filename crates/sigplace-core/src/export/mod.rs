//! Burn placed annotations into a copy of the PDF
//!
//! Annotations are drawn as regular page content, not as PDF annotation
//! objects, so every viewer renders them the same way and they cannot be
//! edited or removed separately afterwards.

mod draw;
mod image;
mod page;

pub use draw::{dashed_rect_segments, helvetica_text_width, PdfRect, Segment};

use crate::annotation::{Annotation, AnnotationKind};
use crate::config::SignerConfig;
use crate::document::page_media_box;
use crate::error::SignError;
use chrono::NaiveDate;
use draw::PlaceholderStyle;
use lopdf::content::Operation;
use lopdf::{dictionary, Document, Object, ObjectId};
use page::PageResources;
use std::fmt::Write as _;
use tracing::{debug, info};

const FONT_NAME: &str = "SpHelv";
const INK_STATE_NAME: &str = "SpInk";

/// Settings for one export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Date stamped under drawn signatures
    pub date: NaiveDate,
    pub config: SignerConfig,
}

impl ExportOptions {
    /// Export with today's local date
    pub fn new(config: SignerConfig) -> Self {
        Self {
            date: chrono::Local::now().date_naive(),
            config,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    fn formatted_date(&self) -> Result<String, SignError> {
        let mut out = String::new();
        write!(out, "{}", self.date.format(&self.config.date_format)).map_err(|_| {
            SignError::Config(format!("Invalid date_format '{}'", self.config.date_format))
        })?;
        Ok(out)
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(SignerConfig::default())
    }
}

/// Shared objects created lazily, at most once per export
#[derive(Default)]
struct SharedObjects {
    font: Option<ObjectId>,
    ink_state: Option<ObjectId>,
}

impl SharedObjects {
    fn font(&mut self, doc: &mut Document) -> ObjectId {
        *self.font.get_or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            })
        })
    }

    fn ink_state(&mut self, doc: &mut Document, opacity: f64) -> ObjectId {
        *self.ink_state.get_or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "ExtGState",
                "CA" => Object::Real(opacity as f32),
                "ca" => Object::Real(opacity as f32),
            })
        })
    }
}

/// Produce a new PDF with `annotations` drawn onto their pages.
///
/// Annotations referring to pages the document does not have are skipped.
/// The input bytes are never modified.
pub fn export_document(
    pdf_bytes: &[u8],
    annotations: &[Annotation],
    options: &ExportOptions,
) -> Result<Vec<u8>, SignError> {
    let config = &options.config;
    config.validate()?;
    let date = options.formatted_date()?;

    let mut doc = Document::load_mem(pdf_bytes).map_err(|e| SignError::Parse(e.to_string()))?;
    let pages = doc.get_pages();
    let page_count = pages.len() as u32;

    for skipped in annotations
        .iter()
        .filter(|a| !pages.contains_key(&a.page_number))
    {
        debug!(
            id = %skipped.id,
            page = skipped.page_number,
            page_count,
            "skipping annotation on missing page"
        );
    }

    let mut shared = SharedObjects::default();
    let mut drawn = 0usize;

    for (&page_number, &page_id) in &pages {
        let on_page: Vec<&Annotation> = annotations
            .iter()
            .filter(|a| a.page_number == page_number)
            .collect();
        if on_page.is_empty() {
            continue;
        }

        let [_, _, _, page_height] = page_media_box(&doc, page_id);
        let mut operations = Vec::new();
        let mut resources = PageResources::default();

        for annotation in on_page {
            let rect = PdfRect::from_ui(
                page_height,
                annotation.x,
                annotation.y,
                annotation.width,
                annotation.height,
            );
            let ops = render_annotation(
                &mut doc,
                &mut shared,
                &mut resources,
                annotation,
                &rect,
                config,
                &date,
            )?;
            operations.extend(ops);
            drawn += 1;
        }

        page::append_content(&mut doc, page_id, operations, &resources)?;
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| SignError::Operation(e.to_string()))?;

    info!(
        drawn,
        skipped = annotations.len() - drawn,
        bytes = output.len(),
        "export complete"
    );
    Ok(output)
}

fn render_annotation(
    doc: &mut Document,
    shared: &mut SharedObjects,
    resources: &mut PageResources,
    annotation: &Annotation,
    rect: &PdfRect,
    config: &SignerConfig,
    date: &str,
) -> Result<Vec<Operation>, SignError> {
    let ops = match &annotation.kind {
        AnnotationKind::Placeholder { label } => {
            resources.font(FONT_NAME, shared.font(doc));
            resources.ext_gstate(INK_STATE_NAME, shared.ink_state(doc, config.ink_opacity));
            let style = PlaceholderStyle {
                font: FONT_NAME,
                ink_state: INK_STATE_NAME,
                dash: config.dash_length,
                gap: config.dash_gap,
                border_width: config.border_width,
                label_font_size: config.label_font_size,
            };
            draw::placeholder_ops(rect, label, &style)
        }
        AnnotationKind::DrawnImage {
            image: signature,
            dated,
        } => {
            let image_id = image::add_image_xobject(doc, signature)?;
            let xobject_name = format!("SpSig{}", image_id.0);
            resources.xobject(&xobject_name, image_id);

            let mut ops = draw::image_ops(rect, &xobject_name);
            if *dated {
                resources.font(FONT_NAME, shared.font(doc));
                ops.extend(draw::date_ops(
                    rect,
                    FONT_NAME,
                    config.date_font_size,
                    config.date_offset,
                    date,
                ));
            }
            ops
        }
        AnnotationKind::Text { text, font_size } => {
            resources.font(FONT_NAME, shared.font(doc));
            let baseline = rect.top() - font_size;
            draw::text_line(FONT_NAME, *font_size, rect.x, baseline, text)
        }
    };
    Ok(ops)
}
