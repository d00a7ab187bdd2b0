//! Output encoding.
//!
//! The finished crop is written in one of three formats: JPEG at full
//! quality, PNG, or lossless WebP.

mod output;

pub use output::{
    encode_output, encode_pixels, write_output, EncodeError, OutputFormat, OUTPUT_QUALITY,
};
