use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::PermissionError;

// MARK: - Resolution

/// Pixel dimensions of a video frame or render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const HD: Self = Self { width: 1280, height: 720 };
    pub const FHD: Self = Self { width: 1920, height: 1080 };
    pub const UHD: Self = Self { width: 3840, height: 2160 };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn total_pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Byte length of a dense 4-byte-per-pixel buffer at this resolution.
    pub fn rgba_len(&self) -> usize {
        self.total_pixels() as usize * 4
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

// MARK: - FacingMode

/// Which camera on a multi-camera device to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing ("selfie") camera.
    User,
    /// Rear-facing camera.
    Environment,
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

// MARK: - Viewport

/// The host's visible viewport in logical pixels, plus its device pixel
/// density. The GPU compositor drawable is sized to `physical_size()`, never
/// to the video's native resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Device pixel ratio (physical pixels per logical pixel).
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        Self { width, height, pixel_ratio }
    }

    /// Physical pixel dimensions: logical size scaled by the pixel ratio.
    pub fn physical_size(&self) -> Resolution {
        Resolution {
            width: (self.width as f64 * self.pixel_ratio).round() as u32,
            height: (self.height as f64 * self.pixel_ratio).round() as u32,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 720, pixel_ratio: 1.0 }
    }
}

// MARK: - ZoomRange

/// Zoom capability advertised by a video track. Immutable for the lifetime of
/// a given track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ZoomRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 1.0, max: 8.0, step: 0.1 }
    }
}

// MARK: - RasterImage

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 4 bytes per pixel: Red, Green, Blue, Alpha.
    Rgba,
    /// 4 bytes per pixel: Blue, Green, Red, Alpha.
    Bgra,
}

/// A raw raster frame: dense pixel data plus its dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl RasterImage {
    pub fn resolution(&self) -> Resolution {
        Resolution { width: self.width, height: self.height }
    }

    /// Expected byte length of a dense 4-byte-per-pixel buffer.
    pub fn expected_len(&self) -> usize {
        self.resolution().rgba_len()
    }

    /// True when the buffer holds exactly width × height × 4 bytes.
    pub fn is_dense(&self) -> bool {
        self.data.len() == self.expected_len()
    }
}

// MARK: - Visibility

/// Page/window visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

// MARK: - Permissions

/// Permission names the host can be queried about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionName {
    Camera,
    Geolocation,
    Notifications,
}

impl PermissionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Geolocation => "geolocation",
            Self::Notifications => "notifications",
        }
    }
}

impl std::fmt::Display for PermissionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

/// Per-name settled outcome of a permission query. A batch query never fails
/// as a whole; each name resolves to a state or its own error.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionReport {
    pub name: PermissionName,
    pub outcome: Result<PermissionState, PermissionError>,
}
