//! Conversions between DOM measurements and core types
//!
//! Kept free of `web-sys` so it can be tested natively.

use sigplace_core::PageBox;

/// Page rectangles arrive from JavaScript as a flat `Float64Array` of
/// `[top, left, bottom, right]` quadruples, one per rendered page in order,
/// straight from `getBoundingClientRect()`.
pub fn page_boxes_from_flat(rects: &[f64]) -> Result<Vec<PageBox>, String> {
    if rects.len() % 4 != 0 {
        return Err(format!(
            "Page rectangles must come in groups of 4 (top, left, bottom, right), got {} values",
            rects.len()
        ));
    }
    if rects.iter().any(|v| !v.is_finite()) {
        return Err("Page rectangles must be finite numbers".to_string());
    }

    Ok(rects
        .chunks_exact(4)
        .map(|r| PageBox {
            top: r[0],
            left: r[1],
            bottom: r[2],
            right: r[3],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigplace_core::{locate_drop, ScreenPoint};

    #[test]
    fn test_flat_rects_to_boxes() {
        let boxes = page_boxes_from_flat(&[-300.0, 40.0, 492.0, 652.0, 502.0, 40.0, 1294.0, 652.0]).unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[1].top, 502.0);
        assert_eq!(boxes[1].width(), 612.0);

        let target = locate_drop(ScreenPoint::new(90.0, 552.0), &boxes).unwrap();
        assert_eq!((target.page_number, target.x, target.y), (2, 50.0, 50.0));
    }

    #[test]
    fn test_empty_is_no_pages() {
        assert!(page_boxes_from_flat(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_ragged_input_rejected() {
        assert!(page_boxes_from_flat(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(page_boxes_from_flat(&[0.0, 0.0, f64::NAN, 10.0]).is_err());
    }
}
