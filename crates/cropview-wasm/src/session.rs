//! Crop session WASM bindings.
//!
//! The browser host owns the frame loop: it forwards pointer events, calls
//! `tick` from `requestAnimationFrame`, and redraws the source with the
//! returned placement and angle whenever `tick` reports a change.
//!
//! # Example
//!
//! ```typescript
//! import { JsCropSession, load_source } from '@cropview/wasm';
//!
//! const session = new JsCropSession(16 / 9, window.devicePixelRatio);
//! session.set_source(load_source(bytes, screen.width, screen.height));
//! session.set_viewport(canvas.width, canvas.height, performance.now());
//!
//! canvas.onpointermove = (e) => session.touch('move', [e.offsetX, e.offsetY], e.timeStamp);
//!
//! const frame = (now: number) => {
//!   if (session.tick(now)) draw(session.placement(), session.angle);
//!   requestAnimationFrame(frame);
//! };
//! requestAnimationFrame(frame);
//! ```

use crate::js_error;
use crate::types::{action_from_str, JsDecodedImage};
use cropview_core::geometry::Point;
use cropview_core::setup::scale_output;
use cropview_core::{CropSession, Degrees, EngineConfig, Size, TouchEvent};
use wasm_bindgen::prelude::*;

/// An interactive crop of one image.
#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Start a session for crops of aspect ratio `ratio` (width / height).
    ///
    /// `density` scales fling thresholds (1.0 = 160 dpi; pass
    /// `window.devicePixelRatio`).
    #[wasm_bindgen(constructor)]
    pub fn new(ratio: f64, density: f64) -> Result<JsCropSession, JsValue> {
        let inner = CropSession::new(ratio, EngineConfig::for_density(density))
            .map_err(|e| js_error("JsCropSession", &e))?;
        Ok(JsCropSession { inner })
    }

    /// The drawing surface is ready or was resized. Resets the placement.
    pub fn set_viewport(&mut self, width: f64, height: f64, now_ms: f64) -> Result<(), JsValue> {
        self.inner
            .set_viewport(Size::new(width, height), now_ms)
            .map_err(|e| js_error("set_viewport", &e))
    }

    /// The drawing surface went away.
    pub fn detach(&mut self) {
        self.inner.detach();
    }

    /// Replace the source image, usually the result of `load_source`.
    pub fn set_source(&mut self, image: &JsDecodedImage) -> Result<(), JsValue> {
        if !image.is_consistent() {
            return Err(js_error("set_source", &"pixel buffer does not match dimensions"));
        }
        self.inner
            .set_source(image.to_decoded())
            .map_err(|e| js_error("set_source", &e))
    }

    /// Forward one pointer event.
    ///
    /// `coords` holds flat `x, y` pairs for every active pointer, primary
    /// first. Unknown action names are ignored.
    pub fn touch(&mut self, action: &str, coords: &[f64], time_ms: f64) {
        if let Some(event) = touch_event(action, coords, time_ms) {
            self.inner.handle_touch(&event);
        }
    }

    /// Rotate to `degrees` (0, 90, 180, 270 or 360). Returns false when
    /// another rotation is still running or the angle is not a target.
    pub fn rotate(&mut self, degrees: u32) -> bool {
        match Degrees::from_degrees(degrees) {
            Some(target) => self.inner.rotate(target),
            None => false,
        }
    }

    /// Rotate a further quarter turn.
    pub fn rotate_next(&mut self) -> bool {
        self.inner.rotate_next()
    }

    /// Advance animations and queued work. Returns true if a redraw is due.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.inner.tick(now_ms)
    }

    #[wasm_bindgen(getter)]
    pub fn angle(&self) -> f64 {
        self.inner.angle()
    }

    #[wasm_bindgen(getter)]
    pub fn is_animating(&self) -> bool {
        self.inner.is_animating()
    }

    /// Unrotated image bounds `{ left, top, right, bottom }`, or `undefined`
    /// before the first layout.
    pub fn placement(&self) -> Result<JsValue, JsValue> {
        match self.inner.layout() {
            Some(_) => serde_wasm_bindgen::to_value(&self.inner.placement())
                .map_err(|e| js_error("placement", &e)),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Crop window bounds, or `undefined` before the first layout.
    pub fn crop_window(&self) -> Result<JsValue, JsValue> {
        match self.inner.layout() {
            Some(layout) => {
                serde_wasm_bindgen::to_value(&layout.crop).map_err(|e| js_error("crop_window", &e))
            }
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Rasterize the crop and scale it for output.
    ///
    /// A zero `output_width`/`output_height` keeps the crop window's own
    /// size. The result is capped to the `max_width` x `max_height` area.
    pub fn confirm(
        &self,
        output_width: u32,
        output_height: u32,
        max_width: u32,
        max_height: u32,
    ) -> Result<JsDecodedImage, JsValue> {
        let crop = self.inner.crop_now().map_err(|e| js_error("confirm", &e))?;
        scale_output(crop, (output_width, output_height), max_width, max_height)
            .map(JsDecodedImage::from_decoded)
            .map_err(|e| js_error("confirm", &e))
    }
}

fn touch_event(action: &str, coords: &[f64], time_ms: f64) -> Option<TouchEvent> {
    let action = action_from_str(action)?;
    let points = coords
        .chunks_exact(2)
        .map(|xy| Point::new(xy[0], xy[1]))
        .collect();
    Some(TouchEvent::new(action, points, time_ms))
}
