//! Source loading WASM bindings.
//!
//! # Functions
//!
//! - [`load_source`] - Decode, validate and subsample a source image
//! - [`source_info`] - Read dimensions and EXIF orientation without decoding
//!
//! # Example
//!
//! ```typescript
//! import { load_source, source_info } from '@cropview/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const info = source_info(bytes); // { width, height, orientation }
//! const source = load_source(bytes, screen.width, screen.height);
//! session.set_source(source);
//! ```

use crate::js_error;
use crate::types::JsDecodedImage;
use cropview_core::{decode, setup};
use wasm_bindgen::prelude::*;

/// Decode a source image for cropping.
///
/// Images covering fewer than 50x50 pixels are rejected before any pixels
/// are decoded. Larger images are subsampled by an integer factor so they
/// land near `max_width` x `max_height`, and EXIF orientation is applied.
///
/// # Errors
///
/// Returns an error if:
/// - The bytes are not a supported image format (JPEG, PNG, WebP)
/// - The image is corrupted or truncated
/// - The image is smaller than 50x50
#[wasm_bindgen]
pub fn load_source(
    bytes: &[u8],
    max_width: u32,
    max_height: u32,
) -> Result<JsDecodedImage, JsValue> {
    setup::load_source_bytes(bytes, max_width, max_height)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| js_error("load_source", &e))
}

/// Read the header of a source image.
///
/// Returns `{ width, height, orientation }`, where width and height are the
/// stored (unrotated) dimensions.
#[wasm_bindgen]
pub fn source_info(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = decode::read_source_info(bytes).map_err(|e| js_error("source_info", &e))?;
    serde_wasm_bindgen::to_value(&info).map_err(|e| js_error("source_info", &e))
}
