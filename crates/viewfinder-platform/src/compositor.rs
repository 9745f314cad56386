use std::sync::Arc;

use viewfinder_core::errors::CompositorError;
use viewfinder_core::{RasterImage, Resolution, Viewport};

use crate::camera::VideoTrack;
use crate::surface::RasterSurface;

/// GPU scene-graph factory. One scene is built per pipeline instance, at
/// render-path commitment, and released when the pipeline stops.
pub trait Compositor: Send + Sync {
    /// Build a scene showing `source` as a single sprite anchored at the
    /// center of a drawable sized to `viewport.physical_size()` — the host's
    /// visible viewport scaled by device pixel density, NOT the video's
    /// native resolution.
    fn build_scene(
        &self,
        source: Arc<dyn VideoTrack>,
        viewport: Viewport,
    ) -> Result<Box<dyn CompositorScene>, CompositorError>;
}

/// A live compositor scene. Serves both the on-screen display and pixel
/// extraction; all three extraction forms derive their dimensions from the
/// drawable's current size. Dropping the scene releases its GPU resources.
pub trait CompositorScene: Send {
    /// Physical drawable size.
    fn drawable_size(&self) -> Resolution;

    /// Uniformly rescale the sprite about its anchor.
    fn set_scale(&mut self, scale: f64);

    fn scale(&self) -> f64;

    /// Raw RGBA pixel buffer of the drawable.
    fn extract_pixels(&self) -> Result<RasterImage, CompositorError>;

    /// Render the drawable into a fresh raster surface.
    fn extract_surface(&self) -> Result<Box<dyn RasterSurface>, CompositorError>;

    /// Lossless encoded string of the drawable.
    fn extract_data_url(&self) -> Result<String, CompositorError>;
}
