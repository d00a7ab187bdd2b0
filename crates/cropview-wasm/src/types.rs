//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core cropview types,
//! handling the conversion between Rust and JavaScript data representations.

use cropview_core::decode::DecodedImage;
use cropview_core::encode::OutputFormat;
use cropview_core::TouchAction;
use wasm_bindgen::prelude::*;

/// A decoded image wrapper for JavaScript.
///
/// Used both for sources handed to a crop session and for the cropped
/// result it hands back.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`. Keep the image in WASM memory and only
/// extract pixels when they are about to be drawn or uploaded.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create a new JsDecodedImage from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 3 for RGB)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Convert back to a core DecodedImage. Clones the pixel data.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }

    /// Whether the buffer length matches the dimensions.
    pub(crate) fn is_consistent(&self) -> bool {
        self.pixels.len() == self.width as usize * self.height as usize * 3
    }
}

/// Convert a u8 format value to the core OutputFormat enum.
///
/// Values:
/// - 0 = JPEG (quality 100)
/// - 1 = PNG
/// - 2 = WebP (lossless)
///
/// Any other value defaults to JPEG.
pub(crate) fn format_from_u8(value: u8) -> OutputFormat {
    match value {
        1 => OutputFormat::Png,
        2 => OutputFormat::WebP,
        _ => OutputFormat::Jpeg,
    }
}

/// Map a DOM-style touch action name to the core enum.
///
/// Accepts `down`, `pointerdown`, `move`, `pointerup`, `up` and `cancel`,
/// ignoring case. Anything else is `None`.
pub(crate) fn action_from_str(name: &str) -> Option<TouchAction> {
    match name.to_ascii_lowercase().as_str() {
        "down" => Some(TouchAction::Down),
        "pointerdown" => Some(TouchAction::PointerDown),
        "move" => Some(TouchAction::Move),
        "pointerup" => Some(TouchAction::PointerUp),
        "up" => Some(TouchAction::Up),
        "cancel" => Some(TouchAction::Cancel),
        _ => None,
    }
}
