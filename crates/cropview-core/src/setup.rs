//! Session setup and output: the host-facing plumbing around the engine.
//!
//! A crop starts from [`CropOptions`]: validate them, load the source at a
//! size the device can hold, hand it to a [`crate::CropSession`], and once
//! the crop is rasterized scale it to the requested output size and write
//! it with [`finish_crop`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::decode::{
    decode_source, downsample, read_source_info, sample_size, DecodeError, DecodedImage,
};
use crate::encode::{encode_output, write_output, EncodeError, OutputFormat};
use crate::layout::LayoutError;

/// Smallest accepted source, in pixels of area.
pub const MIN_SOURCE_AREA: u64 = 50 * 50;

/// Failures that end a crop session before it starts.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("No output destination was given")]
    MissingOutput,

    #[error("Source image not found: {0}")]
    SourceNotFound(String),

    #[error("Source image is {width}x{height}; it must cover at least 50x50 pixels")]
    SourceTooSmall { width: u32, height: u32 },

    #[error("Failed to load source image: {0}")]
    Decode(#[from] DecodeError),

    #[error("Source image cannot be laid out: {0}")]
    Layout(#[from] LayoutError),
}

/// What to crop, where to put the result, and how.
///
/// An output size of zero on either axis means "unspecified": the crop is
/// square and saved at the crop window's own size.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    pub source: PathBuf,
    pub output: PathBuf,
    pub output_width: u32,
    pub output_height: u32,
    pub format: OutputFormat,
}

impl CropOptions {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    pub fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    fn has_output_size(&self) -> bool {
        self.output_width > 0 && self.output_height > 0
    }

    /// Crop aspect ratio, width over height.
    pub fn crop_ratio(&self) -> f64 {
        if self.has_output_size() {
            f64::from(self.output_width) / f64::from(self.output_height)
        } else {
            1.0
        }
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.output.as_os_str().is_empty() {
            return Err(SetupError::MissingOutput);
        }
        Ok(())
    }
}

/// Decode a source from memory, rejecting tiny images and subsampling
/// large ones to roughly `max_width` x `max_height`.
///
/// The size check runs on the header alone, before any pixels are decoded.
pub fn load_source_bytes(
    bytes: &[u8],
    max_width: u32,
    max_height: u32,
) -> Result<DecodedImage, SetupError> {
    let info = read_source_info(bytes)?;
    let (width, height) = info.oriented_dimensions();
    if info.area() < MIN_SOURCE_AREA {
        warn!(width, height, "source below minimum size");
        return Err(SetupError::SourceTooSmall { width, height });
    }

    let image = decode_source(bytes)?;
    let factor = sample_size(image.width, image.height, max_width, max_height);
    let image = downsample(&image, factor)?;
    info!(
        source_width = width,
        source_height = height,
        width = image.width,
        height = image.height,
        factor,
        "source loaded"
    );
    Ok(image)
}

/// Read and decode the source file named by `path`.
pub fn load_source(
    path: &Path,
    max_width: u32,
    max_height: u32,
) -> Result<DecodedImage, SetupError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SetupError::SourceNotFound(path.display().to_string())
        } else {
            SetupError::Decode(DecodeError::IoError(e.to_string()))
        }
    })?;
    load_source_bytes(&bytes, max_width, max_height)
}

/// Final output size for a crop.
///
/// An unspecified request falls back to `crop_size`. When the requested
/// area exceeds the device area `max_width * max_height`, both axes are
/// divided by the larger of the two axis ratios.
pub fn output_dimensions(
    requested: (u32, u32),
    crop_size: (u32, u32),
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    let (width, height) = if requested.0 > 0 && requested.1 > 0 {
        requested
    } else {
        crop_size
    };

    let device_area = u64::from(max_width) * u64::from(max_height);
    let area = u64::from(width) * u64::from(height);
    if max_width == 0 || max_height == 0 || area <= device_area {
        return (width, height);
    }

    let scale = (f64::from(width) / f64::from(max_width))
        .max(f64::from(height) / f64::from(max_height));
    (
        ((f64::from(width) / scale) as u32).max(1),
        ((f64::from(height) / scale) as u32).max(1),
    )
}

/// Scale a rasterized crop to the size [`output_dimensions`] picks.
///
/// The crop is returned untouched when no scaling is needed.
pub fn scale_output(
    crop: DecodedImage,
    requested: (u32, u32),
    max_width: u32,
    max_height: u32,
) -> Result<DecodedImage, EncodeError> {
    let (width, height) =
        output_dimensions(requested, (crop.width, crop.height), max_width, max_height);
    if (width, height) == (crop.width, crop.height) {
        return Ok(crop);
    }
    let rgb = crop.to_rgb_image().ok_or(EncodeError::InvalidPixelData {
        expected: crop.width as usize * crop.height as usize * 3,
        actual: crop.pixels.len(),
    })?;
    let resized =
        image::imageops::resize(&rgb, width, height, image::imageops::FilterType::Triangle);
    Ok(DecodedImage::from_rgb_image(resized))
}

/// Scale a rasterized crop to its output size, encode it, and write it.
pub fn finish_crop(
    crop: DecodedImage,
    options: &CropOptions,
    max_width: u32,
    max_height: u32,
) -> Result<(u32, u32), EncodeError> {
    let output = scale_output(
        crop,
        (options.output_width, options.output_height),
        max_width,
        max_height,
    )?;
    let (width, height) = (output.width, output.height);

    let bytes = encode_output(&output, options.format)?;
    write_output(&bytes, &options.output).inspect_err(|e| warn!(error = %e, "saving crop failed"))?;
    info!(
        width,
        height,
        format = ?options.format,
        path = %options.output.display(),
        "crop saved"
    );
    Ok((width, height))
}
