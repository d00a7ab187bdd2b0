//! Source image decoding.
//!
//! This module provides functionality for:
//! - Reading source dimensions and EXIF orientation without decoding pixels
//! - Decoding JPEG, PNG and WebP sources with orientation applied
//! - Subsampling large sources down to what the device can display
//!
//! All operations are synchronous; the session runs them on a worker and
//! posts the result back to the interaction timeline.

mod resize;
mod source;
mod types;

pub use resize::{downsample, resize, sample_size};
pub use source::{decode_source, read_orientation, read_source_info};
pub use types::{DecodeError, DecodedImage, Orientation, SourceInfo};
