use serde::{Deserialize, Serialize};

use crate::types::FacingMode;

/// Constraints handed to the device when acquiring a capture stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConstraints {
    #[serde(alias = "facingMode")]
    pub facing_mode: FacingMode,
    pub width: u32,
    pub height: u32,
    /// Zoom hint forwarded to the device; 1.0 = no zoom.
    pub zoom: f64,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            width: 1920,
            height: 1080,
            zoom: 1.0,
        }
    }
}

/// Which rendering strategy to commit to once the stream is playable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Compositor scene: texture + sprite + render target.
    Gpu,
    /// Raster copy into a live 2D surface every tick.
    Cpu,
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gpu => write!(f, "gpu"),
            Self::Cpu => write!(f, "cpu"),
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    #[serde(alias = "renderMode")]
    pub render_mode: RenderMode,
    /// Minimum interval between CPU-path draws, in milliseconds. Ticks that
    /// arrive earlier are skipped, keeping the redraw rate below the host
    /// refresh rate.
    #[serde(alias = "minDrawIntervalMs")]
    pub min_draw_interval_ms: u64,
    pub constraints: CaptureConstraints,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Gpu,
            min_draw_interval_ms: 90,
            constraints: CaptureConstraints::default(),
        }
    }
}
