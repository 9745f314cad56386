use std::sync::Arc;

use async_trait::async_trait;
use viewfinder_core::errors::SurfaceError;
use viewfinder_core::{RasterImage, Resolution};

use crate::camera::VideoTrack;

// MARK: - VideoSurface

/// The live video playback element a capture stream is attached to.
#[async_trait]
pub trait VideoSurface: Send {
    /// Attach a video track; playback begins.
    fn attach(&mut self, track: Arc<dyn VideoTrack>) -> Result<(), SurfaceError>;

    /// Resolves once the video reports native playable dimensions. The
    /// pipeline awaits this before committing a render path.
    async fn wait_playable(&mut self) -> Result<Resolution, SurfaceError>;

    /// Native pixel dimensions of the video, valid after `wait_playable`.
    fn native_size(&self) -> Resolution;

    /// The frame currently displayed, if playback has started.
    fn frame(&self) -> Option<RasterImage>;
}

// MARK: - RasterSurface

/// A 2D raster surface: draw-image, resize, raw pixel readback and
/// encode-to-string. The CPU render path owns two of these (live + snapshot).
pub trait RasterSurface: Send {
    fn size(&self) -> Resolution;

    /// Resize the surface. Like a host canvas, resizing clears the contents.
    fn resize(&mut self, size: Resolution);

    /// Copy the video's current frame into this surface, scaled to the
    /// surface's dimensions.
    fn draw_video(&mut self, video: &dyn VideoSurface) -> Result<(), SurfaceError>;

    /// Raw RGBA readback at the surface's current dimensions.
    fn image_data(&self) -> RasterImage;

    /// Lossless PNG data-URL of the surface contents.
    fn to_data_url(&self) -> Result<String, SurfaceError>;
}
