//! Cropview Core - fixed-ratio photo crop engine
//!
//! This crate provides the interactive geometry behind a touch-driven crop
//! screen: a crop window of fixed aspect ratio sits in the middle of the
//! viewport while the user pans, pinches and rotates the photo underneath
//! it. The engine keeps the photo covering the window, flings it after fast
//! releases, animates corrections, and finally rasterizes the selection.
//!
//! # Overview
//!
//! - [`layout`] sizes the crop window and the initial cover placement
//! - [`gesture`] turns touch events into pan and pinch edits
//! - [`bounds`] answers coverage and scroll-limit questions in screen space
//! - [`animation`] holds the fling, correction and rotation animations
//! - [`raster`] renders the final crop from an immutable snapshot
//! - [`session`] owns all of the above on one interaction timeline
//! - [`setup`], [`decode`] and [`encode`] load the source and save the output
//!
//! The crate never installs a `tracing` subscriber; hosts choose their own.

pub mod animation;
pub mod bounds;
pub mod config;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod raster;
pub mod schedule;
pub mod session;
pub mod setup;

pub use animation::{ActiveAnimation, Degrees};
pub use config::EngineConfig;
pub use decode::{DecodeError, DecodedImage};
pub use encode::{EncodeError, OutputFormat};
pub use geometry::{Point, Rect, Size, Vector};
pub use gesture::{GestureAction, GesturePhase, TouchAction, TouchEvent};
pub use layout::{solve_layout, Layout, LayoutError};
pub use raster::{rasterize, CropSnapshot, RasterError};
pub use schedule::{TaskId, TaskQueue};
pub use session::CropSession;
pub use setup::{CropOptions, SetupError};
