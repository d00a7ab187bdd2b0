//! The crop session: one owner of all interactive state.
//!
//! Everything that mutates the placement or angle happens through
//! `&mut CropSession` on a single interaction timeline: touch events,
//! rotate requests, and [`CropSession::tick`], which runs due queued tasks
//! and then advances whichever animation is active. Decoding and
//! rasterizing run on rayon workers; they see only owned copies of what
//! they need and hand results back through the session's [`TaskQueue`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::animation::{
    plan_correction, ActiveAnimation, CorrectionState, Degrees, FlingState, RotationState,
};
use crate::bounds::{pinch_scale, Coverage};
use crate::config::EngineConfig;
use crate::decode::DecodedImage;
use crate::geometry::{apply_screen_edit, to_screen, Point, Rect, ScreenEdit, Size, Vector};
use crate::gesture::{GestureAction, GesturePhase, GestureSession, TouchEvent};
use crate::layout::{solve_layout, Layout, LayoutError};
use crate::raster::{rasterize, CropSnapshot, RasterError};
use crate::schedule::TaskQueue;
use crate::setup::{load_source_bytes, SetupError};

/// Interactive state for cropping one image.
pub struct CropSession {
    config: EngineConfig,
    ratio: f64,
    source: Option<Arc<DecodedImage>>,
    viewport: Option<Size>,
    layout: Option<Layout>,
    placement: Rect,
    angle: f64,
    degrees: Degrees,
    gesture: GestureSession,
    animation: ActiveAnimation,
    queue: TaskQueue<CropSession>,
}

impl std::fmt::Debug for CropSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropSession")
            .field("ratio", &self.ratio)
            .field("layout", &self.layout)
            .field("placement", &self.placement)
            .field("angle", &self.angle)
            .field("animation", &self.animation.kind())
            .finish_non_exhaustive()
    }
}

impl CropSession {
    /// Start a session for a crop of aspect ratio `ratio` (width / height).
    pub fn new(ratio: f64, config: EngineConfig) -> Result<Self, LayoutError> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(LayoutError::InvalidRatio(ratio));
        }
        Ok(Self {
            gesture: GestureSession::new(config.velocity_horizon_ms),
            config,
            ratio,
            source: None,
            viewport: None,
            layout: None,
            placement: Rect::default(),
            angle: 0.0,
            degrees: Degrees::D0,
            animation: ActiveAnimation::None,
            queue: TaskQueue::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// The solved layout, once both a viewport and a source exist.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Unrotated placement of the image.
    pub fn placement(&self) -> Rect {
        self.placement
    }

    /// Current (interpolated) rotation angle in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The last requested rotation target.
    pub fn degrees(&self) -> Degrees {
        self.degrees
    }

    pub fn source(&self) -> Option<&Arc<DecodedImage>> {
        self.source.as_ref()
    }

    pub fn animation(&self) -> &ActiveAnimation {
        &self.animation
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    /// True while an animation still needs ticks.
    pub fn is_animating(&self) -> bool {
        !self.animation.is_none()
    }

    /// The session's task queue, for posting work onto the interaction
    /// timeline from other threads.
    pub fn queue(&self) -> &TaskQueue<CropSession> {
        &self.queue
    }

    /// Screen-space bounds of the image as currently drawn.
    pub fn screen_placement(&self) -> Option<Rect> {
        let layout = self.layout.as_ref()?;
        Some(to_screen(&self.placement, self.angle, layout.crop.center()))
    }

    fn coverage(&self) -> Option<Coverage> {
        let layout = self.layout.as_ref()?;
        Some(Coverage::new(
            to_screen(&self.placement, self.angle, layout.crop.center()),
            layout.crop,
        ))
    }

    /// The surface is ready with the given size. Buffered tasks are released
    /// and the layout is solved again, discarding gestures and animations.
    pub fn set_viewport(&mut self, viewport: Size, now_ms: f64) -> Result<(), LayoutError> {
        if viewport.is_empty() {
            return Err(LayoutError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = Some(viewport);
        self.queue.attach(now_ms);
        self.solve()
    }

    /// The surface went away; queued work waits for the next viewport.
    pub fn detach(&mut self) {
        self.queue.detach();
        self.gesture.reset();
        self.animation = ActiveAnimation::None;
    }

    /// Replace the source image. The layout is solved again if a viewport
    /// is already known.
    pub fn set_source(&mut self, image: DecodedImage) -> Result<(), LayoutError> {
        if image.is_empty() {
            return Err(LayoutError::InvalidSource {
                width: f64::from(image.width),
                height: f64::from(image.height),
            });
        }
        self.source = Some(Arc::new(image));
        self.solve()
    }

    /// Decode `bytes` on a worker and install the result as the source.
    ///
    /// `done` runs on the interaction timeline, from [`CropSession::tick`],
    /// once the source is installed or the load has failed.
    pub fn load_source<F>(&self, bytes: Vec<u8>, max_width: u32, max_height: u32, done: F)
    where
        F: FnOnce(&mut CropSession, Result<(), SetupError>) + Send + 'static,
    {
        let queue = self.queue.clone();
        rayon::spawn(move || {
            let loaded = load_source_bytes(&bytes, max_width, max_height);
            queue.post(move |session: &mut CropSession| {
                let result = loaded
                    .and_then(|image| session.set_source(image).map_err(SetupError::from));
                if let Err(e) = &result {
                    warn!(error = %e, "source load failed");
                }
                done(session, result);
            });
        });
    }

    fn solve(&mut self) -> Result<(), LayoutError> {
        let (Some(viewport), Some(source)) = (self.viewport, self.source.as_ref()) else {
            return Ok(());
        };
        let source_size = Size::new(f64::from(source.width), f64::from(source.height));
        let layout = solve_layout(viewport, self.ratio, source_size, &self.config)?;
        info!(
            viewport_width = viewport.width,
            viewport_height = viewport.height,
            crop_width = layout.crop.width(),
            crop_height = layout.crop.height(),
            "layout solved"
        );
        self.layout = Some(layout);
        self.placement = layout.placement;
        self.angle = 0.0;
        self.degrees = Degrees::D0;
        self.gesture.reset();
        self.animation = ActiveAnimation::None;
        Ok(())
    }

    /// Feed one touch event. Events before the first layout are ignored.
    pub fn handle_touch(&mut self, event: &TouchEvent) {
        let Some(layout) = self.layout else {
            return;
        };
        let pivot = layout.crop.center();

        match self.gesture.handle(event) {
            GestureAction::None => {}
            GestureAction::Begin => {
                // A rotation finishes on its own and then corrects.
                if !self.animation.is_rotating() && !self.animation.is_none() {
                    debug!(aborted = self.animation.kind(), "touch aborts animation");
                    self.animation = ActiveAnimation::None;
                }
            }
            GestureAction::Pan(delta) => {
                self.apply_edit(&ScreenEdit::translation(delta), pivot);
            }
            GestureAction::Pinch { ratio, shift } => {
                let screen = to_screen(&self.placement, self.angle, pivot);
                let scale = pinch_scale(ratio, &screen, layout.max_visible);
                self.apply_edit(&ScreenEdit::new(scale, shift), pivot);
            }
            GestureAction::Release => self.release(event),
            GestureAction::Cancel => {
                if !self.animation.is_rotating() {
                    self.start_correction();
                }
            }
        }
    }

    fn apply_edit(&mut self, edit: &ScreenEdit, pivot: Point) {
        self.placement = apply_screen_edit(&self.placement, edit, self.angle, pivot);
    }

    fn release(&mut self, event: &TouchEvent) {
        if self.animation.is_rotating() {
            return;
        }
        let Some(coverage) = self.coverage() else {
            return;
        };
        if coverage.too_small() {
            self.start_correction();
            return;
        }

        let raw = self.gesture.release_velocity(self.config.max_fling_velocity);
        let velocity = coverage.filter_velocity(raw);
        let min = self.config.min_fling_velocity;
        if velocity.dx.abs() > min || velocity.dy.abs() > min {
            let start = event.primary().unwrap_or_default();
            self.animation = ActiveAnimation::Fling(FlingState::new(start, velocity, &self.config));
        } else {
            self.start_correction();
        }
    }

    /// Pan in screen space, stopping exactly at the crop window's edges.
    fn strict_pan(&mut self, delta: Vector) {
        let Some(coverage) = self.coverage() else {
            return;
        };
        let applied = coverage.clamp_pan(delta);
        let pivot = coverage.crop.center();
        self.apply_edit(&ScreenEdit::translation(applied), pivot);
    }

    fn start_correction(&mut self) {
        let Some(coverage) = self.coverage() else {
            self.animation = ActiveAnimation::None;
            return;
        };
        if self.config.skip_correction_when_covered && coverage.covers() {
            self.animation = ActiveAnimation::None;
            return;
        }
        let edit = match plan_correction(&coverage.screen, &coverage.crop) {
            Some(edit) => edit,
            None => match self.recover_placement() {
                Some(edit) => edit,
                None => {
                    self.animation = ActiveAnimation::None;
                    return;
                }
            },
        };
        debug!(
            scale = edit.scale,
            dx = edit.translate.dx,
            dy = edit.translate.dy,
            "correction started"
        );
        self.animation = ActiveAnimation::Correction(CorrectionState::new(
            self.placement,
            edit,
            self.config.correction_duration_ms,
        ));
    }

    /// Put a collapsed placement back to the cover placement and plan the
    /// correction that makes it cover at the current angle.
    fn recover_placement(&mut self) -> Option<ScreenEdit> {
        let layout = self.layout?;
        warn!(placement = ?self.placement, "placement collapsed, restoring cover fit");
        self.placement = layout.placement;
        let coverage = self.coverage()?;
        plan_correction(&coverage.screen, &coverage.crop)
    }

    /// Turn the image to `target`. Returns `false` (and does nothing) while
    /// another rotation is still running. Any fling or correction stops.
    pub fn rotate(&mut self, target: Degrees) -> bool {
        if self.animation.is_rotating() {
            return false;
        }
        let state = RotationState::new(self.angle, target, self.config.rotation_duration_ms);
        debug!(from = state.from(), to = target.as_degrees(), "rotation started");
        self.angle = state.from();
        self.degrees = target;
        self.animation = ActiveAnimation::Rotation(state);
        true
    }

    /// Rotate to the next of the five targets.
    pub fn rotate_next(&mut self) -> bool {
        self.rotate(self.degrees.next())
    }

    /// Advance the interaction timeline to `now_ms`.
    ///
    /// Runs queued tasks that are due, then steps the active animation.
    /// Returns `true` if anything changed and the host should redraw.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let queue = self.queue.clone();
        let ran = queue.run_due(now_ms, self);
        let animated = self.step_animation(now_ms);
        ran > 0 || animated
    }

    fn step_animation(&mut self, now_ms: f64) -> bool {
        let Some(layout) = self.layout else {
            return false;
        };
        let pivot = layout.crop.center();

        match std::mem::take(&mut self.animation) {
            ActiveAnimation::None => false,
            ActiveAnimation::Fling(mut fling) => {
                let (delta, finished) = fling.step(now_ms);
                self.strict_pan(delta);
                if finished {
                    debug!("fling finished");
                    self.start_correction();
                } else {
                    self.animation = ActiveAnimation::Fling(fling);
                }
                true
            }
            ActiveAnimation::Correction(mut correction) => {
                let (placement, finished) = correction.step(now_ms, self.angle, pivot);
                self.placement = placement;
                if finished {
                    debug!("correction finished");
                } else {
                    self.animation = ActiveAnimation::Correction(correction);
                }
                true
            }
            ActiveAnimation::Rotation(mut rotation) => {
                let (angle, finished) = rotation.step(now_ms);
                self.angle = angle;
                if finished {
                    debug!(angle, "rotation finished");
                    self.start_correction();
                } else {
                    self.animation = ActiveAnimation::Rotation(rotation);
                }
                true
            }
        }
    }

    /// Freeze what the rasterizer needs.
    pub fn snapshot(&self) -> Option<CropSnapshot> {
        let layout = self.layout?;
        Some(CropSnapshot {
            layout,
            placement: self.placement,
            angle: self.angle,
        })
    }

    /// Rasterize the crop on the calling thread.
    pub fn crop_now(&self) -> Result<DecodedImage, RasterError> {
        let snapshot = self.snapshot().ok_or(RasterError::NotReady)?;
        let source = self.source.as_ref().ok_or(RasterError::NotReady)?;
        rasterize(&snapshot, source)
    }

    /// Rasterize the crop on a worker.
    ///
    /// The current state is snapshotted before returning, so later gestures
    /// do not affect the result. `callback` runs on the interaction timeline
    /// from a later [`CropSession::tick`].
    pub fn crop<F>(&self, callback: F) -> Result<(), RasterError>
    where
        F: FnOnce(&mut CropSession, Result<DecodedImage, RasterError>) + Send + 'static,
    {
        let snapshot = self.snapshot().ok_or(RasterError::NotReady)?;
        let source = Arc::clone(self.source.as_ref().ok_or(RasterError::NotReady)?);
        let queue = self.queue.clone();
        rayon::spawn(move || {
            let result = rasterize(&snapshot, &source);
            match &result {
                Ok(image) => info!(width = image.width, height = image.height, "crop finished"),
                Err(e) => warn!(error = %e, "crop failed"),
            }
            queue.post(move |session: &mut CropSession| callback(session, result));
        });
        Ok(())
    }
}
