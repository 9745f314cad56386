//! viewfinder-platform — host capability traits for the render pipeline.
//!
//! The pipeline core never touches a real host environment directly. Every
//! host interaction goes through one of the traits in this crate:
//!
//! | Trait | Host concern |
//! |-------|--------------|
//! | [`CameraDevice`] / [`CaptureStream`] / [`VideoTrack`] | hardware capture |
//! | [`VideoSurface`] | live video playback element |
//! | [`RasterSurface`] | 2D raster drawing + readback |
//! | [`Compositor`] / [`CompositorScene`] | GPU scene graph |
//! | [`FrameScheduler`] | per-refresh callback scheduling |
//! | [`VisibilitySignal`] | foreground/background transitions |
//!
//! [`Platform`] bundles them so the pipeline takes a single injected handle
//! and stays testable without any real host. The [`synthetic`] module is the
//! in-process implementation used by the demo binary and the test suite.

pub mod camera;
pub mod compositor;
pub mod host;
pub mod surface;
pub mod synthetic;

pub use camera::{CameraDevice, CaptureStream, TrackCapabilities, TrackReadyState, VideoTrack};
pub use compositor::{Compositor, CompositorScene};
pub use host::{FrameScheduler, Platform, VisibilitySignal};
pub use surface::{RasterSurface, VideoSurface};
