use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use viewfinder_core::{Viewport, Visibility};

use crate::camera::CameraDevice;
use crate::compositor::Compositor;
use crate::surface::{RasterSurface, VideoSurface};

/// Per-refresh scheduling primitive.
///
/// `next_frame` completes at the next display refresh with a monotonically
/// increasing timestamp in milliseconds. Cancelling the next invocation is
/// simply not re-awaiting (or dropping the in-flight future) — there is no
/// handle to revoke.
#[async_trait]
pub trait FrameScheduler: Send + Sync {
    async fn next_frame(&self) -> u64;
}

/// Foreground/background signal. Observers subscribe to a watch channel;
/// dropping the receiver removes the observer.
pub trait VisibilitySignal: Send + Sync {
    fn subscribe(&self) -> watch::Receiver<Visibility>;
}

/// The injected platform-capability bundle. The pipeline takes one of these
/// and never reaches for a global host environment, so the core runs under
/// any host — including the synthetic in-process one used in tests.
pub trait Platform {
    fn camera(&self) -> Arc<dyn CameraDevice>;

    fn compositor(&self) -> Arc<dyn Compositor>;

    fn scheduler(&self) -> Arc<dyn FrameScheduler>;

    fn visibility(&self) -> Arc<dyn VisibilitySignal>;

    /// The host's visible viewport and device pixel density.
    fn viewport(&self) -> Viewport;

    /// Allocate a video playback surface.
    fn video_surface(&self) -> Box<dyn VideoSurface>;

    /// Allocate a 2D raster surface.
    fn raster_surface(&self) -> Box<dyn RasterSurface>;
}
