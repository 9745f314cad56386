//! viewfinder-pipeline — the capture → render → snapshot pipeline.
//!
//! ```text
//! CameraDevice ──acquire──► MediaStreamManager ──track──► VideoSurface
//!                                                             │
//!                                              (playable: native WxH)
//!                                                             │
//!                                               render-path commitment
//!                                               ┌─────────────┴─────────────┐
//!                                               ▼                           ▼
//!                                     GpuPath (compositor          CpuPath (live + snapshot
//!                                      scene, one sprite)           raster surfaces, frame tick)
//! ```
//!
//! The pipeline emits `streamLoad` / `streamLoadError` / `initdone` / `error`
//! on its [`EventBus`](viewfinder_core::EventBus) and answers snapshot and
//! export calls any time after `initdone`.

pub mod path;
pub mod pipeline;
pub mod stream;

pub use path::{ActivePath, CpuPath, FrameTiming, GpuPath};
pub use pipeline::{PipelineState, RenderPipeline, TickOutcome};
pub use stream::MediaStreamManager;
