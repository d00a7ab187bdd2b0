//! Cropview WASM - WebAssembly bindings for the cropview engine
//!
//! This crate exposes a crop session and its source/output plumbing to
//! JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `session` - `JsCropSession`: viewport, touch, rotate, tick, confirm
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Source loading (validate, subsample, EXIF orientation)
//! - `encode` - Output encoding (JPEG, PNG, WebP)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession, load_source, encode_crop } from '@cropview/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const session = new JsCropSession(1, window.devicePixelRatio);
//! session.set_source(load_source(bytes, screen.width, screen.height));
//! session.set_viewport(canvas.width, canvas.height, performance.now());
//! // ... forward pointer events, call session.tick(now) every frame ...
//! const jpeg = encode_crop(session.confirm(0, 0, screen.width, screen.height), 0);
//! ```

use std::fmt::Display;

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod session;
mod types;

// Re-export public types
pub use decode::{load_source, source_info};
pub use encode::{encode_crop, output_size};
pub use session::JsCropSession;
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Log a failed call to the browser console and turn it into a JS error value.
pub(crate) fn js_error(context: &str, err: &dyn Display) -> JsValue {
    let message = format!("{context}: {err}");
    web_sys::console::warn_1(&JsValue::from_str(&message));
    js_sys::Error::new(&message).into()
}
