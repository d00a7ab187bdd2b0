//! Output encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_crop`] - Encode a cropped image as JPEG, PNG or WebP
//! - [`output_size`] - Final output dimensions for a crop on this device
//!
//! # Example
//!
//! ```typescript
//! import { encode_crop } from '@cropview/wasm';
//!
//! const crop = session.confirm(1080, 1080, screen.width, screen.height);
//! const png = encode_crop(crop, 1);
//! ```

use crate::js_error;
use crate::types::{format_from_u8, JsDecodedImage};
use cropview_core::{encode, setup};
use wasm_bindgen::prelude::*;

/// Encode a cropped image.
///
/// # Arguments
///
/// * `image` - The crop returned by `JsCropSession.confirm`
/// * `format` - 0=JPEG (quality 100), 1=PNG, 2=WebP (lossless)
///
/// # Errors
///
/// Returns an error if:
/// - The pixel data length doesn't match width * height * 3
/// - Width or height is zero
/// - Encoding fails internally
#[wasm_bindgen]
pub fn encode_crop(image: &JsDecodedImage, format: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_output(&image.to_decoded(), format_from_u8(format))
        .map_err(|e| js_error("encode_crop", &e))
}

/// Output size `[width, height]` for a crop of `crop_width` x `crop_height`.
///
/// A zero requested size falls back to the crop size; sizes whose area
/// exceeds the device area are scaled down.
#[wasm_bindgen]
pub fn output_size(
    requested_width: u32,
    requested_height: u32,
    crop_width: u32,
    crop_height: u32,
    max_width: u32,
    max_height: u32,
) -> Vec<u32> {
    let (width, height) = setup::output_dimensions(
        (requested_width, requested_height),
        (crop_width, crop_height),
        max_width,
        max_height,
    );
    vec![width, height]
}
