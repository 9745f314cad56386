use std::sync::Arc;

use async_trait::async_trait;
use viewfinder_core::errors::{AcquireError, PermissionError, TrackError, ZoomError};
use viewfinder_core::{CaptureConstraints, PermissionName, PermissionState, RasterImage, ZoomRange};

// MARK: - CameraDevice

/// The hardware capture entry point.
///
/// `acquire` is asynchronous and single-shot: it either yields a live
/// capture stream or one of the four acquisition failures, never retrying
/// internally.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, AcquireError>;

    /// Query one named permission. Batch semantics (per-name settling) are
    /// layered on top by the stream manager.
    async fn query_permission(
        &self,
        name: PermissionName,
    ) -> Result<PermissionState, PermissionError>;
}

// MARK: - CaptureStream

/// An opaque live hardware stream. Dropping the stream does NOT release the
/// device — the owner must stop the track explicitly.
pub trait CaptureStream: Send {
    /// The first (and only) video channel of this stream.
    fn video_track(&self) -> Arc<dyn VideoTrack>;
}

// MARK: - VideoTrack

/// Capability descriptor of a video track. Immutable for the track's life.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackCapabilities {
    /// Present iff the device supports native (optical/sensor) zoom.
    pub zoom: Option<ZoomRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackReadyState {
    Live,
    Ended,
}

/// A single video channel within a capture stream.
#[async_trait]
pub trait VideoTrack: Send + Sync {
    fn capabilities(&self) -> TrackCapabilities;

    fn ready_state(&self) -> TrackReadyState;

    /// Disable/enable frame delivery without releasing the hardware handle.
    fn set_enabled(&self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Release the hardware. Irreversible for this track.
    fn stop(&self);

    /// Apply native zoom on the device. Best-effort; rejections surface as
    /// [`ZoomError`] so the pipeline can report them.
    async fn apply_zoom(&self, value: f64) -> Result<(), ZoomError>;

    /// Latest frame delivered by the device, if any. Video surfaces mirror
    /// the track through this.
    fn current_frame(&self) -> Option<RasterImage>;

    /// Grab one frame straight from the track, bypassing any render surface.
    /// Not every host supports this.
    async fn grab_frame(&self) -> Result<RasterImage, TrackError>;
}
