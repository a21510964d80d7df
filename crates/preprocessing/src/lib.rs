//! Screenshot preprocessing for element capture
//!
//! Turns a raw page screenshot plus on-screen element geometry into a tightly
//! cropped, DPI-normalized JPEG centered on the element, along with the
//! element's center expressed in the cropped image's own coordinate frame.
//!
//! The crop is computed entirely in memory: decode, clamp-based crop, JPEG
//! re-encode. Downstream OCR ranking consumes the adjusted center.

mod data_uri;
mod geometry;

pub use data_uri::decode_data_uri;
pub use geometry::{crop_geometry, CropGeometry, MINIMUM_BUFFER};

use std::io::Cursor;

use element_insight_common::{Point, Size};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while preprocessing an uploaded screenshot
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("image data is not a base64 data URI")]
    InvalidDataUri,

    #[error("failed to decode base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to decode screenshot: {0}")]
    ImageDecode(#[source] image::ImageError),

    #[error("failed to encode cropped image: {0}")]
    ImageEncode(#[source] image::ImageError),
}

/// A cropped element image plus the element center relative to the crop
#[derive(Debug, Clone)]
pub struct CropOutput {
    /// JPEG-encoded crop
    pub jpeg_data: Vec<u8>,
    /// Element center in the cropped image's coordinate frame
    pub adjusted_center: Point,
}

/// Crop a screenshot down to the region around one element.
///
/// The screenshot's true pixel dimensions are read from the decoded image and
/// used as the clamp bound; the reported window size only feeds the DPI
/// correction. The result is re-encoded as JPEG in memory.
///
/// # Errors
/// Returns [`PreprocessError::ImageDecode`] for malformed image bytes. All
/// remaining steps are deterministic for valid input.
pub fn preprocess_image(
    image_bytes: &[u8],
    element_center: Point,
    element_size: Size,
    window_size: Size,
) -> Result<CropOutput, PreprocessError> {
    let decoded = image::load_from_memory(image_bytes).map_err(PreprocessError::ImageDecode)?;

    let screenshot_size = Size::new(decoded.width() as i32, decoded.height() as i32);

    let crop = crop_geometry(element_center, element_size, window_size, screenshot_size);
    debug!(
        region = ?crop.region,
        adjusted_center = ?crop.adjusted_center,
        "cropping screenshot"
    );

    let cropped = decoded.crop_imm(
        crop.region.x as u32,
        crop.region.y as u32,
        crop.region.width as u32,
        crop.region.height as u32,
    );

    // JPEG has no alpha channel, so flatten to RGB before encoding
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(cropped.to_rgb8())
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(PreprocessError::ImageEncode)?;

    Ok(CropOutput {
        jpeg_data: buffer.into_inner(),
        adjusted_center: crop.adjusted_center,
    })
}
