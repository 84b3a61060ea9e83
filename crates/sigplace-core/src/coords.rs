//! Coordinate transformation between screen, page and PDF coordinate systems
//!
//! - Screen space: client coordinates of the pointer, origin top-left.
//! - Page space: offset from a rendered page's own top-left corner.
//! - PDF space: points, origin bottom-left of the page.

use serde::{Deserialize, Serialize};

/// Pointer position in screen (client) coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screen extent of one rendered page, as reported by the layout at drop time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageBox {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl PageBox {
    pub fn from_origin(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            bottom: top + height,
            right: left + width,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether `y` falls within the page's vertical extent (edges inclusive)
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.top && y <= self.bottom
    }
}

/// The page (1-based) and page-relative offset a dragged item landed on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DropTarget {
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
}

/// Resolve a drop point against the rendered pages.
///
/// Pages are scanned in order and the first one whose vertical extent holds
/// the pointer wins. Returns `None` when the pointer is in a margin between or
/// around pages.
pub fn locate_drop(point: ScreenPoint, pages: &[PageBox]) -> Option<DropTarget> {
    pages
        .iter()
        .enumerate()
        .find(|(_, page)| page.contains_y(point.y))
        .map(|(index, page)| DropTarget {
            page_number: index as u32 + 1,
            x: point.x - page.left,
            y: point.y - page.top,
        })
}

/// Flip a top-left origin y offset into PDF space
pub fn ui_to_pdf_y(page_height: f64, y: f64) -> f64 {
    page_height - y
}
