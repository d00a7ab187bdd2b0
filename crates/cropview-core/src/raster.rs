//! Off-screen rendering of the final crop.
//!
//! Rendering never reads live session state: it takes a [`CropSnapshot`]
//! by value, so it can run on a worker thread while the interaction
//! timeline keeps mutating the placement.
//!
//! # Algorithm
//!
//! 1. Draw the whole viewport: for every surface pixel, undo the rotation
//!    about the crop center to land in the placement frame, map that onto
//!    source pixel coordinates and sample bilinearly. Pixels outside the
//!    image are black.
//! 2. Cut the crop window out of the surface and resample it to the crop
//!    window's integral size with a triangle (bilinear) filter.

use image::imageops::{self, FilterType};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::decode::DecodedImage;
use crate::geometry::{Point, Rect};
use crate::layout::Layout;

/// Errors raised while rasterizing a crop.
#[derive(Debug, Error)]
pub enum RasterError {
    /// No layout or no source image yet.
    #[error("Crop session is not ready: no layout or source image")]
    NotReady,

    /// The off-screen surface could not be allocated.
    #[error("Failed to allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    /// The crop window does not overlap the surface.
    #[error("Crop window is empty")]
    EmptyCrop,

    /// The source or surface buffer was inconsistent with its dimensions.
    #[error("Resampling failed: {0}")]
    Resample(String),
}

/// Everything needed to render the crop, frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSnapshot {
    pub layout: Layout,
    /// Unrotated placement of the image.
    pub placement: Rect,
    /// Current (possibly mid-animation) rotation in degrees.
    pub angle: f64,
}

/// Zeroed RGB buffer, failing instead of aborting when memory is short.
fn allocate(width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
    let failed = || RasterError::SurfaceAllocation { width, height };
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(failed)?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| failed())?;
    buffer.resize(len, 0);
    Ok(buffer)
}

/// Bilinear sample at continuous pixel coordinates (pixel centers at `.5`
/// offsets already removed). `None` outside the image.
#[inline]
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> Option<[u8; 3]> {
    let (w, h) = (image.width as f64, image.height as f64);
    if x < -0.5 || y < -0.5 || x > w - 0.5 || y > h - 0.5 {
        return None;
    }

    let max_x = image.width as usize - 1;
    let max_y = image.height as usize - 1;
    let x = x.clamp(0.0, max_x as f64);
    let y = y.clamp(0.0, max_y as f64);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let at = |px: usize, py: usize, c: usize| -> f64 {
        f64::from(image.pixels[(py * image.width as usize + px) * 3 + c])
    };

    let mut result = [0u8; 3];
    for (c, out) in result.iter_mut().enumerate() {
        let v = at(x0, y0, c) * (1.0 - fx) * (1.0 - fy)
            + at(x1, y0, c) * fx * (1.0 - fy)
            + at(x0, y1, c) * (1.0 - fx) * fy
            + at(x1, y1, c) * fx * fy;
        *out = v.clamp(0.0, 255.0).round() as u8;
    }
    Some(result)
}

fn check_source(source: &DecodedImage) -> Result<(), RasterError> {
    let expected = (source.width as usize)
        .checked_mul(source.height as usize)
        .and_then(|n| n.checked_mul(3));
    if source.is_empty() || expected != Some(source.pixels.len()) {
        return Err(RasterError::Resample(format!(
            "source buffer of {} bytes does not match {}x{}",
            source.pixels.len(),
            source.width,
            source.height
        )));
    }
    Ok(())
}

/// Draw the rotated, placed image over a black viewport-sized surface.
pub fn render_viewport(
    snapshot: &CropSnapshot,
    source: &DecodedImage,
) -> Result<DecodedImage, RasterError> {
    check_source(source)?;

    let viewport = snapshot.layout.viewport;
    let width = viewport.width().round().max(0.0) as u32;
    let height = viewport.height().round().max(0.0) as u32;
    if width == 0 || height == 0 || snapshot.placement.is_empty() {
        return Err(RasterError::EmptyCrop);
    }
    let mut pixels = allocate(width, height)?;

    let pivot = snapshot.layout.crop.center();
    let placement = snapshot.placement;
    let angle = snapshot.angle;
    let scale_x = f64::from(source.width) / placement.width();
    let scale_y = f64::from(source.height) / placement.height();
    let row_len = width as usize * 3;

    pixels
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                let screen = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let local = screen.rotate_about(-angle, pivot);
                let sx = (local.x - placement.left) * scale_x - 0.5;
                let sy = (local.y - placement.top) * scale_y - 0.5;
                if let Some(rgb) = sample_bilinear(source, sx, sy) {
                    px.copy_from_slice(&rgb);
                }
            }
        });

    Ok(DecodedImage::new(width, height, pixels))
}

/// Cut `crop` out of a rendered surface, resampled to its integral size.
pub fn extract_crop(surface: &DecodedImage, crop: &Rect) -> Result<DecodedImage, RasterError> {
    let out_w = crop.width().round();
    let out_h = crop.height().round();
    if out_w < 1.0 || out_h < 1.0 {
        return Err(RasterError::EmptyCrop);
    }

    let left = crop.left.floor().max(0.0);
    let top = crop.top.floor().max(0.0);
    let right = crop.right.ceil().min(f64::from(surface.width));
    let bottom = crop.bottom.ceil().min(f64::from(surface.height));
    if right <= left || bottom <= top {
        return Err(RasterError::EmptyCrop);
    }

    let rgb = surface
        .to_rgb_image()
        .ok_or_else(|| RasterError::Resample("surface buffer size mismatch".to_string()))?;
    let region = imageops::crop_imm(
        &rgb,
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    )
    .to_image();

    let (out_w, out_h) = (out_w as u32, out_h as u32);
    if region.dimensions() == (out_w, out_h) {
        return Ok(DecodedImage::from_rgb_image(region));
    }
    let resized = imageops::resize(&region, out_w, out_h, FilterType::Triangle);
    Ok(DecodedImage::from_rgb_image(resized))
}

/// Render the viewport and extract the crop window in one go.
pub fn rasterize(
    snapshot: &CropSnapshot,
    source: &DecodedImage,
) -> Result<DecodedImage, RasterError> {
    let surface = render_viewport(snapshot, source)?;
    let crop = extract_crop(&surface, &snapshot.layout.crop)?;
    debug!(
        width = crop.width,
        height = crop.height,
        angle = snapshot.angle,
        "crop rasterized"
    );
    Ok(crop)
}
