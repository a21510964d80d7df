//! Crop-rectangle math for element screenshots
//!
//! Pure integer geometry: given an element's center and size, the reported
//! window size, and the screenshot's true pixel size, compute a padded crop
//! rectangle clamped to the screenshot bounds. High-DPI captures (screenshot
//! wider than the reported window) are corrected by scaling every geometric
//! input before any other arithmetic.

use element_insight_common::{Point, Rectangle, Size};
use tracing::debug;

/// Padding added on every side of the element, in logical pixels
pub const MINIMUM_BUFFER: i32 = 100;

/// Tolerance before a screenshot/window width ratio counts as a DPI mismatch
const DPI_EPSILON: f64 = 0.05;

/// A crop rectangle plus the element center relative to that rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropGeometry {
    pub region: Rectangle,
    pub adjusted_center: Point,
}

/// Compute the crop rectangle for an element within a screenshot.
///
/// The returned rectangle always lies within `[0, screenshot_size]` and has
/// non-negative extent; there is no failure path.
#[must_use]
pub fn crop_geometry(
    element_center: Point,
    element_size: Size,
    window_size: Size,
    screenshot_size: Size,
) -> CropGeometry {
    let mut center = element_center;
    let mut element = element_size;
    let mut buffer = MINIMUM_BUFFER;

    // Screenshots from high-density displays come in at a multiple of the
    // logical window size; every geometric input must be scaled by the same
    // factor before the crop math runs.
    if window_size.width > 0 {
        let dpi_scale = f64::from(screenshot_size.width) / f64::from(window_size.width);
        if (dpi_scale - 1.0).abs() > DPI_EPSILON {
            debug!(dpi_scale, "applying DPI correction to crop geometry");
            center = Point::new(scale(center.x, dpi_scale), scale(center.y, dpi_scale));
            element = Size::new(scale(element.width, dpi_scale), scale(element.height, dpi_scale));
            buffer = scale(buffer, dpi_scale);
        }
    }

    let new_size = Size::new(element.width + 2 * buffer, element.height + 2 * buffer);

    // The origin stays inside the screenshot even for an off-screen center
    let left = (center.x - new_size.width / 2)
        .max(0)
        .min(screenshot_size.width);
    let top = (center.y - new_size.height / 2)
        .max(0)
        .min(screenshot_size.height);

    // Shrink the extent by however far the padded region would overhang the
    // screenshot edge, never below zero.
    let width = (new_size.width - (new_size.width + left - screenshot_size.width).max(0)).max(0);
    let height = (new_size.height - (new_size.height + top - screenshot_size.height).max(0)).max(0);

    CropGeometry {
        region: Rectangle::new(left, top, width, height),
        adjusted_center: Point::new(center.x - left, center.y - top),
    }
}

/// Multiply by a DPI factor, truncating toward zero
fn scale(value: i32, factor: f64) -> i32 {
    (f64::from(value) * factor) as i32
}
