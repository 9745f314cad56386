//! The two render paths, sealed behind [`ActivePath`].
//!
//! The path is chosen exactly once, at the moment the stream becomes
//! playable, and never re-selected for the life of a pipeline instance.
//! Each variant exposes only the operations valid for it: the CPU path owns
//! the live/snapshot raster surfaces and the rate-limited frame tick, the
//! GPU path owns the compositor scene and its extraction calls.

use std::sync::Arc;

use viewfinder_core::errors::{CompositorError, SurfaceError};
use viewfinder_core::{RasterImage, RenderMode, Resolution, Viewport};
use viewfinder_platform::{Compositor, CompositorScene, RasterSurface, VideoSurface, VideoTrack};

// ── FrameTiming ───────────────────────────────────────────────────────────────

/// Rate limiter for the CPU frame tick: a draw happens only when the elapsed
/// time since the last draw exceeds the minimum interval. The first tick
/// always draws.
#[derive(Debug)]
pub struct FrameTiming {
    min_interval_ms: u64,
    last_draw_ms: Option<u64>,
}

impl FrameTiming {
    pub fn new(min_interval_ms: u64) -> Self {
        Self { min_interval_ms, last_draw_ms: None }
    }

    pub fn should_draw(&self, now_ms: u64) -> bool {
        match self.last_draw_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.min_interval_ms,
        }
    }

    pub fn mark_drawn(&mut self, now_ms: u64) {
        self.last_draw_ms = Some(now_ms);
    }

    pub fn last_draw_ms(&self) -> Option<u64> {
        self.last_draw_ms
    }
}

// ── CpuPath ───────────────────────────────────────────────────────────────────

/// CPU pixel-copy path: two independent raster surfaces so that a capture
/// never interrupts continuous rendering.
pub struct CpuPath {
    live: Box<dyn RasterSurface>,
    snapshot: Box<dyn RasterSurface>,
    timing: FrameTiming,
}

impl CpuPath {
    pub fn new(
        live: Box<dyn RasterSurface>,
        snapshot: Box<dyn RasterSurface>,
        min_interval_ms: u64,
    ) -> Self {
        Self { live, snapshot, timing: FrameTiming::new(min_interval_ms) }
    }

    /// One frame-tick body. Returns `Ok(true)` when a draw happened.
    ///
    /// The live surface is re-synchronized to the video's current native
    /// resolution on every draw — never to the display viewport — because
    /// pixel-extraction correctness depends on it.
    pub fn tick(&mut self, timestamp_ms: u64, video: &dyn VideoSurface) -> Result<bool, SurfaceError> {
        if !self.timing.should_draw(timestamp_ms) {
            return Ok(false);
        }
        self.timing.mark_drawn(timestamp_ms);
        self.live.resize(video.native_size());
        self.live.draw_video(video)?;
        Ok(true)
    }

    /// Draw a fresh frame into the dedicated snapshot surface and encode it.
    /// The live surface is untouched.
    pub fn shot(&mut self, video: &dyn VideoSurface) -> Result<String, SurfaceError> {
        self.snapshot.resize(video.native_size());
        self.snapshot.draw_video(video)?;
        self.snapshot.to_data_url()
    }

    /// Raw RGBA readback of the live surface at its current dimensions.
    pub fn image_data(&self) -> RasterImage {
        self.live.image_data()
    }

    pub fn live_size(&self) -> Resolution {
        self.live.size()
    }

    pub fn snapshot_size(&self) -> Resolution {
        self.snapshot.size()
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }
}

// ── GpuPath ───────────────────────────────────────────────────────────────────

/// GPU compositor path: one scene (texture + sprite + render target) serving
/// both live display and extraction. The scene is released when the path is
/// dropped, which the pipeline binds to its `Stopped` transition.
pub struct GpuPath {
    scene: Box<dyn CompositorScene>,
}

impl GpuPath {
    /// Build the compositor scene: the video as a single sprite at the
    /// center of a drawable sized to the host viewport scaled by device
    /// pixel density.
    pub fn commit(
        compositor: &dyn Compositor,
        source: Arc<dyn VideoTrack>,
        viewport: Viewport,
    ) -> Result<Self, CompositorError> {
        let scene = compositor.build_scene(source, viewport)?;
        Ok(Self { scene })
    }

    /// Uniformly rescale the sprite about its anchor. No viewport
    /// re-centering happens; zoom beyond 1 does not recompute a crop window.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.scene.set_scale(zoom);
    }

    pub fn zoom(&self) -> f64 {
        self.scene.scale()
    }

    pub fn drawable_size(&self) -> Resolution {
        self.scene.drawable_size()
    }

    pub fn extract_pixels(&self) -> Result<RasterImage, CompositorError> {
        self.scene.extract_pixels()
    }

    pub fn extract_surface(&self) -> Result<Box<dyn RasterSurface>, CompositorError> {
        self.scene.extract_surface()
    }

    pub fn extract_data_url(&self) -> Result<String, CompositorError> {
        self.scene.extract_data_url()
    }
}

// ── ActivePath ────────────────────────────────────────────────────────────────

/// The committed render path. Sealed: there is no way to swap variants after
/// commitment short of tearing the pipeline down.
pub enum ActivePath {
    Gpu(GpuPath),
    Cpu(CpuPath),
}

impl ActivePath {
    pub fn mode(&self) -> RenderMode {
        match self {
            Self::Gpu(_) => RenderMode::Gpu,
            Self::Cpu(_) => RenderMode::Cpu,
        }
    }

    pub fn as_cpu_mut(&mut self) -> Option<&mut CpuPath> {
        match self {
            Self::Cpu(cpu) => Some(cpu),
            Self::Gpu(_) => None,
        }
    }

    pub fn as_cpu(&self) -> Option<&CpuPath> {
        match self {
            Self::Cpu(cpu) => Some(cpu),
            Self::Gpu(_) => None,
        }
    }

    pub fn as_gpu_mut(&mut self) -> Option<&mut GpuPath> {
        match self {
            Self::Gpu(gpu) => Some(gpu),
            Self::Cpu(_) => None,
        }
    }

    pub fn as_gpu(&self) -> Option<&GpuPath> {
        match self {
            Self::Gpu(gpu) => Some(gpu),
            Self::Cpu(_) => None,
        }
    }
}
