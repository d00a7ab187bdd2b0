//! Subsampling for sources too large to hold at full size.

use super::{DecodeError, DecodedImage};

/// Resample `image` to exactly `width` x `height` with a triangle filter.
///
/// Returns a clone when the size already matches.
pub fn resize(image: &DecodedImage, width: u32, height: u32) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }
    if (image.width, image.height) == (width, height) {
        return Ok(image.clone());
    }
    let rgb = image.to_rgb_image().ok_or_else(|| {
        DecodeError::CorruptedFile("pixel buffer does not match dimensions".to_string())
    })?;
    let resized =
        image::imageops::resize(&rgb, width, height, image::imageops::FilterType::Triangle);
    Ok(DecodedImage::from_rgb_image(resized))
}

/// Integral subsampling factor that brings a source close to a target size.
///
/// Each axis ratio is rounded to the nearest integer and the smaller of the
/// two wins, so neither side ends up much smaller than requested. Sources
/// that already fit are left at full size.
pub fn sample_size(width: u32, height: u32, req_width: u32, req_height: u32) -> u32 {
    if req_width == 0 || req_height == 0 {
        return 1;
    }
    if height <= req_height && width <= req_width {
        return 1;
    }
    let height_ratio = (f64::from(height) / f64::from(req_height)).round() as u32;
    let width_ratio = (f64::from(width) / f64::from(req_width)).round() as u32;
    height_ratio.min(width_ratio).max(1)
}

/// Shrink an image by an integral factor, as a subsampling decoder would.
pub fn downsample(image: &DecodedImage, factor: u32) -> Result<DecodedImage, DecodeError> {
    if factor <= 1 {
        return Ok(image.clone());
    }
    let width = (image.width / factor).max(1);
    let height = (image.height / factor).max(1);
    resize(image, width, height)
}
