//! In-process host implementation.
//!
//! Backs the demo binary and the test suite with a deterministic camera
//! (procedural test pattern), in-memory raster surfaces, a software
//! compositor and manually- or interval-driven frame scheduling. No real
//! hardware or windowing system is touched anywhere in this module.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::debug;
use viewfinder_core::errors::{
    AcquireError, CompositorError, PermissionError, SurfaceError, TrackError, ZoomError,
};
use viewfinder_core::snapshot::{encode_data_url, MIME_PNG};
use viewfinder_core::{
    CaptureConstraints, PermissionName, PermissionState, PixelFormat, RasterImage, Resolution,
    Viewport, Visibility, ZoomRange,
};

use crate::camera::{CameraDevice, CaptureStream, TrackCapabilities, TrackReadyState, VideoTrack};
use crate::compositor::{Compositor, CompositorScene};
use crate::host::{FrameScheduler, Platform, VisibilitySignal};
use crate::surface::{RasterSurface, VideoSurface};

// ── Test pattern ──────────────────────────────────────────────────────────────

/// Deterministic RGBA gradient; the blue channel carries the frame sequence
/// number so tests can tell frames apart.
fn test_pattern(resolution: Resolution, seq: u64) -> RasterImage {
    let mut data = vec![0u8; resolution.rgba_len()];
    for y in 0..resolution.height {
        for x in 0..resolution.width {
            let i = ((y * resolution.width + x) * 4) as usize;
            data[i] = (x & 0xFF) as u8;
            data[i + 1] = (y & 0xFF) as u8;
            data[i + 2] = (seq & 0xFF) as u8;
            data[i + 3] = 0xFF;
        }
    }
    RasterImage {
        data: Bytes::from(data),
        width: resolution.width,
        height: resolution.height,
        format: PixelFormat::Rgba,
    }
}

fn png_data_url(width: u32, height: u32, pixels: &[u8]) -> Result<String, String> {
    let img = image::RgbaImage::from_raw(width, height, pixels.to_vec())
        .ok_or_else(|| "pixel buffer does not match dimensions".to_owned())?;
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| e.to_string())?;
    Ok(encode_data_url(MIME_PNG, &buf.into_inner()))
}

// ── SyntheticCamera ───────────────────────────────────────────────────────────

/// Configurable fake camera device.
pub struct SyntheticCamera {
    zoom_range: Option<ZoomRange>,
    fail_with: Option<AcquireError>,
    grab_supported: bool,
    permissions: HashMap<PermissionName, PermissionState>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        let mut permissions = HashMap::new();
        permissions.insert(PermissionName::Camera, PermissionState::Granted);
        Self { zoom_range: None, fail_with: None, grab_supported: true, permissions }
    }

    /// Advertise native zoom support on acquired tracks.
    pub fn with_zoom_range(mut self, range: ZoomRange) -> Self {
        self.zoom_range = Some(range);
        self
    }

    /// Make every `acquire` fail with the given error.
    pub fn failing_with(mut self, error: AcquireError) -> Self {
        self.fail_with = Some(error);
        self
    }

    pub fn without_grab(mut self) -> Self {
        self.grab_supported = false;
        self
    }

    pub fn with_permission(mut self, name: PermissionName, state: PermissionState) -> Self {
        self.permissions.insert(name, state);
        self
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraDevice for SyntheticCamera {
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, AcquireError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        if constraints.width == 0 || constraints.height == 0 {
            return Err(AcquireError::ConstraintsUnsatisfiable {
                reason: format!("{}×{} is not a capturable size", constraints.width, constraints.height),
            });
        }
        let track = SyntheticTrack::new(
            Resolution::new(constraints.width, constraints.height),
            self.zoom_range,
            self.grab_supported,
        );
        debug!(
            "synthetic camera acquired: {} facing={}",
            track.resolution, constraints.facing_mode
        );
        Ok(Box::new(SyntheticStream { track: Arc::new(track) }))
    }

    async fn query_permission(
        &self,
        name: PermissionName,
    ) -> Result<PermissionState, PermissionError> {
        self.permissions
            .get(&name)
            .copied()
            .ok_or_else(|| PermissionError::Unsupported { name: name.to_string() })
    }
}

// ── SyntheticStream / SyntheticTrack ──────────────────────────────────────────

pub struct SyntheticStream {
    track: Arc<SyntheticTrack>,
}

impl CaptureStream for SyntheticStream {
    fn video_track(&self) -> Arc<dyn VideoTrack> {
        Arc::clone(&self.track) as Arc<dyn VideoTrack>
    }
}

pub struct SyntheticTrack {
    resolution: Resolution,
    zoom_range: Option<ZoomRange>,
    grab_supported: bool,
    enabled: AtomicBool,
    ended: AtomicBool,
    native_zoom_bits: AtomicU64,
    frame_seq: AtomicU64,
}

impl SyntheticTrack {
    fn new(resolution: Resolution, zoom_range: Option<ZoomRange>, grab_supported: bool) -> Self {
        Self {
            resolution,
            zoom_range,
            grab_supported,
            enabled: AtomicBool::new(true),
            ended: AtomicBool::new(false),
            native_zoom_bits: AtomicU64::new(1.0f64.to_bits()),
            frame_seq: AtomicU64::new(0),
        }
    }

    /// Last zoom value the device accepted. Test inspector.
    pub fn native_zoom(&self) -> f64 {
        f64::from_bits(self.native_zoom_bits.load(Ordering::Relaxed))
    }
}

#[async_trait]
impl VideoTrack for SyntheticTrack {
    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities { zoom: self.zoom_range }
    }

    fn ready_state(&self) -> TrackReadyState {
        if self.ended.load(Ordering::Relaxed) {
            TrackReadyState::Ended
        } else {
            TrackReadyState::Live
        }
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn stop(&self) {
        self.ended.store(true, Ordering::Relaxed);
    }

    async fn apply_zoom(&self, value: f64) -> Result<(), ZoomError> {
        let Some(range) = self.zoom_range else {
            return Err(ZoomError::Unsupported);
        };
        if !range.contains(value) {
            return Err(ZoomError::Rejected {
                reason: format!("{value} outside [{}, {}]", range.min, range.max),
            });
        }
        self.native_zoom_bits.store(value.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    fn current_frame(&self) -> Option<RasterImage> {
        if self.ended.load(Ordering::Relaxed) {
            return None;
        }
        // A disabled track freezes on its last frame rather than advancing.
        let seq = if self.enabled.load(Ordering::Relaxed) {
            self.frame_seq.fetch_add(1, Ordering::Relaxed) + 1
        } else {
            self.frame_seq.load(Ordering::Relaxed)
        };
        Some(test_pattern(self.resolution, seq))
    }

    async fn grab_frame(&self) -> Result<RasterImage, TrackError> {
        if !self.grab_supported {
            return Err(TrackError::GrabUnsupported);
        }
        if self.ended.load(Ordering::Relaxed) {
            return Err(TrackError::NotLive);
        }
        let seq = self.frame_seq.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(test_pattern(self.resolution, seq))
    }
}

// ── SyntheticVideoSurface ─────────────────────────────────────────────────────

pub struct SyntheticVideoSurface {
    track: Option<Arc<dyn VideoTrack>>,
    native: Resolution,
}

impl SyntheticVideoSurface {
    pub fn new() -> Self {
        Self { track: None, native: Resolution::new(0, 0) }
    }
}

impl Default for SyntheticVideoSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoSurface for SyntheticVideoSurface {
    fn attach(&mut self, track: Arc<dyn VideoTrack>) -> Result<(), SurfaceError> {
        self.track = Some(track);
        Ok(())
    }

    async fn wait_playable(&mut self) -> Result<Resolution, SurfaceError> {
        let track = self
            .track
            .as_ref()
            .ok_or_else(|| SurfaceError::Attach { reason: "no track attached".into() })?;
        // Model asynchronous metadata arrival.
        tokio::task::yield_now().await;
        let frame = track.current_frame().ok_or_else(|| SurfaceError::NotPlayable {
            reason: "track ended before the first frame".into(),
        })?;
        self.native = frame.resolution();
        Ok(self.native)
    }

    fn native_size(&self) -> Resolution {
        self.native
    }

    fn frame(&self) -> Option<RasterImage> {
        self.track.as_ref().and_then(|t| t.current_frame())
    }
}

// ── SyntheticRasterSurface ────────────────────────────────────────────────────

pub struct SyntheticRasterSurface {
    size: Resolution,
    pixels: Vec<u8>,
}

impl SyntheticRasterSurface {
    pub fn new() -> Self {
        Self { size: Resolution::new(0, 0), pixels: Vec::new() }
    }

    fn from_pixels(size: Resolution, pixels: Vec<u8>) -> Self {
        Self { size, pixels }
    }
}

impl Default for SyntheticRasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterSurface for SyntheticRasterSurface {
    fn size(&self) -> Resolution {
        self.size
    }

    fn resize(&mut self, size: Resolution) {
        self.size = size;
        self.pixels = vec![0u8; size.rgba_len()];
    }

    fn draw_video(&mut self, video: &dyn VideoSurface) -> Result<(), SurfaceError> {
        let frame = video
            .frame()
            .ok_or_else(|| SurfaceError::Draw { reason: "video has no current frame".into() })?;
        blit_fill(&frame, self.size, &mut self.pixels);
        Ok(())
    }

    fn image_data(&self) -> RasterImage {
        RasterImage {
            data: Bytes::copy_from_slice(&self.pixels),
            width: self.size.width,
            height: self.size.height,
            format: PixelFormat::Rgba,
        }
    }

    fn to_data_url(&self) -> Result<String, SurfaceError> {
        png_data_url(self.size.width, self.size.height, &self.pixels)
            .map_err(|reason| SurfaceError::Encode { reason })
    }
}

/// Nearest-neighbour copy of `src` scaled to fill `dst_size` exactly.
fn blit_fill(src: &RasterImage, dst_size: Resolution, dst: &mut [u8]) {
    if dst_size.is_empty() || src.width == 0 || src.height == 0 {
        return;
    }
    for y in 0..dst_size.height {
        let sy = (y as u64 * src.height as u64 / dst_size.height as u64) as u32;
        for x in 0..dst_size.width {
            let sx = (x as u64 * src.width as u64 / dst_size.width as u64) as u32;
            let si = ((sy * src.width + sx) * 4) as usize;
            let di = ((y * dst_size.width + x) * 4) as usize;
            dst[di..di + 4].copy_from_slice(&src.data[si..si + 4]);
        }
    }
}

// ── Synthetic compositor ──────────────────────────────────────────────────────

pub struct SyntheticCompositor;

impl Compositor for SyntheticCompositor {
    fn build_scene(
        &self,
        source: Arc<dyn VideoTrack>,
        viewport: Viewport,
    ) -> Result<Box<dyn CompositorScene>, CompositorError> {
        let drawable = viewport.physical_size();
        if drawable.is_empty() {
            return Err(CompositorError::SceneBuild {
                reason: format!("viewport resolves to empty drawable {drawable}"),
            });
        }
        debug!("compositor scene built: drawable {drawable}");
        Ok(Box::new(SyntheticScene { source, drawable, scale: 1.0 }))
    }
}

pub struct SyntheticScene {
    source: Arc<dyn VideoTrack>,
    drawable: Resolution,
    scale: f64,
}

impl SyntheticScene {
    /// Software render of the scene: the source sprite, uniformly scaled
    /// about its center anchor, composed onto the drawable.
    fn compose(&self) -> Result<Vec<u8>, CompositorError> {
        let frame = self.source.current_frame().ok_or_else(|| CompositorError::Extract {
            reason: "video source has ended".into(),
        })?;
        let mut buf = vec![0u8; self.drawable.rgba_len()];
        blit_centered(&frame, self.scale, self.drawable, &mut buf);
        Ok(buf)
    }
}

/// Draw `src` scaled by `scale`, centered on the drawable. Pixels outside the
/// sprite stay transparent black.
fn blit_centered(src: &RasterImage, scale: f64, dst_size: Resolution, dst: &mut [u8]) {
    if scale <= 0.0 || src.width == 0 || src.height == 0 {
        return;
    }
    let dw = dst_size.width as f64;
    let dh = dst_size.height as f64;
    let sw = src.width as f64 * scale;
    let sh = src.height as f64 * scale;
    let left = (dw - sw) / 2.0;
    let top = (dh - sh) / 2.0;
    for y in 0..dst_size.height {
        let fy = (y as f64 - top) / scale;
        if fy < 0.0 || fy >= src.height as f64 {
            continue;
        }
        let sy = fy as u32;
        for x in 0..dst_size.width {
            let fx = (x as f64 - left) / scale;
            if fx < 0.0 || fx >= src.width as f64 {
                continue;
            }
            let sx = fx as u32;
            let si = ((sy * src.width + sx) * 4) as usize;
            let di = ((y * dst_size.width + x) * 4) as usize;
            dst[di..di + 4].copy_from_slice(&src.data[si..si + 4]);
        }
    }
}

impl CompositorScene for SyntheticScene {
    fn drawable_size(&self) -> Resolution {
        self.drawable
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn extract_pixels(&self) -> Result<RasterImage, CompositorError> {
        let buf = self.compose()?;
        Ok(RasterImage {
            data: Bytes::from(buf),
            width: self.drawable.width,
            height: self.drawable.height,
            format: PixelFormat::Rgba,
        })
    }

    fn extract_surface(&self) -> Result<Box<dyn RasterSurface>, CompositorError> {
        let buf = self.compose()?;
        Ok(Box::new(SyntheticRasterSurface::from_pixels(self.drawable, buf)))
    }

    fn extract_data_url(&self) -> Result<String, CompositorError> {
        let buf = self.compose()?;
        png_data_url(self.drawable.width, self.drawable.height, &buf)
            .map_err(|reason| CompositorError::Extract { reason })
    }
}

impl Drop for SyntheticScene {
    fn drop(&mut self) {
        debug!("compositor scene released ({})", self.drawable);
    }
}

// ── Schedulers ────────────────────────────────────────────────────────────────

/// Test scheduler: ticks fire only when pushed, with explicit timestamps.
pub struct ManualScheduler {
    tx: mpsc::UnboundedSender<u64>,
    rx: Mutex<mpsc::UnboundedReceiver<u64>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx: Mutex::new(rx) }
    }

    /// Queue one refresh callback at the given timestamp.
    pub fn push(&self, timestamp_ms: u64) {
        let _ = self.tx.send(timestamp_ms);
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameScheduler for ManualScheduler {
    async fn next_frame(&self) -> u64 {
        match self.rx.lock().await.recv().await {
            Some(ts) => ts,
            // The sender half lives in `self`, so this is unreachable; pend
            // rather than invent a timestamp.
            None => std::future::pending().await,
        }
    }
}

/// Wall-clock scheduler approximating a display refresh cadence.
pub struct IntervalScheduler {
    start: Instant,
    period: Duration,
}

impl IntervalScheduler {
    pub fn new(period: Duration) -> Self {
        Self { start: Instant::now(), period }
    }

    /// ~60 Hz.
    pub fn per_display_refresh() -> Self {
        Self::new(Duration::from_millis(16))
    }
}

#[async_trait]
impl FrameScheduler for IntervalScheduler {
    async fn next_frame(&self) -> u64 {
        tokio::time::sleep(self.period).await;
        self.start.elapsed().as_millis() as u64
    }
}

// ── Visibility ────────────────────────────────────────────────────────────────

/// Manually switched visibility signal.
pub struct SyntheticVisibility {
    tx: watch::Sender<Visibility>,
}

impl SyntheticVisibility {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Visibility::Visible);
        Self { tx }
    }

    pub fn set(&self, visibility: Visibility) {
        let _ = self.tx.send(visibility);
    }
}

impl Default for SyntheticVisibility {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilitySignal for SyntheticVisibility {
    fn subscribe(&self) -> watch::Receiver<Visibility> {
        self.tx.subscribe()
    }
}

// ── SyntheticPlatform ─────────────────────────────────────────────────────────

/// Full in-process platform bundle.
pub struct SyntheticPlatform {
    camera: Arc<SyntheticCamera>,
    compositor: Arc<SyntheticCompositor>,
    scheduler: Arc<dyn FrameScheduler>,
    visibility: Arc<SyntheticVisibility>,
    viewport: Viewport,
}

impl SyntheticPlatform {
    pub fn new(camera: SyntheticCamera, viewport: Viewport) -> Self {
        Self {
            camera: Arc::new(camera),
            compositor: Arc::new(SyntheticCompositor),
            scheduler: Arc::new(IntervalScheduler::per_display_refresh()),
            visibility: Arc::new(SyntheticVisibility::new()),
            viewport,
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn FrameScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Handle for flipping the visibility signal from tests or the demo.
    pub fn visibility_switch(&self) -> Arc<SyntheticVisibility> {
        Arc::clone(&self.visibility)
    }
}

impl Platform for SyntheticPlatform {
    fn camera(&self) -> Arc<dyn CameraDevice> {
        Arc::clone(&self.camera) as Arc<dyn CameraDevice>
    }

    fn compositor(&self) -> Arc<dyn Compositor> {
        Arc::clone(&self.compositor) as Arc<dyn Compositor>
    }

    fn scheduler(&self) -> Arc<dyn FrameScheduler> {
        Arc::clone(&self.scheduler)
    }

    fn visibility(&self) -> Arc<dyn VisibilitySignal> {
        Arc::clone(&self.visibility) as Arc<dyn VisibilitySignal>
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn video_surface(&self) -> Box<dyn VideoSurface> {
        Box::new(SyntheticVideoSurface::new())
    }

    fn raster_surface(&self) -> Box<dyn RasterSurface> {
        Box::new(SyntheticRasterSurface::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(width: u32, height: u32) -> CaptureConstraints {
        CaptureConstraints { width, height, ..CaptureConstraints::default() }
    }

    #[test]
    fn test_pattern_is_dense_and_tagged_by_sequence() {
        let frame = test_pattern(Resolution::new(8, 4), 7);
        assert!(frame.is_dense());
        // Blue channel carries the sequence number.
        assert_eq!(frame.data[2], 7);
        assert_eq!(frame.data[3], 0xFF);
    }

    #[tokio::test]
    async fn acquire_yields_a_live_track_at_the_requested_size() {
        let camera = SyntheticCamera::new();
        let stream = camera.acquire(&constraints(640, 480)).await.expect("acquire");
        let track = stream.video_track();
        assert_eq!(track.ready_state(), TrackReadyState::Live);
        let frame = track.current_frame().expect("frame");
        assert_eq!(frame.resolution(), Resolution::new(640, 480));
    }

    #[tokio::test]
    async fn acquire_respects_configured_failure() {
        let camera = SyntheticCamera::new().failing_with(AcquireError::PermissionDenied);
        let err = camera.acquire(&constraints(640, 480)).await.err().expect("must fail");
        assert_eq!(err, AcquireError::PermissionDenied);
    }

    #[tokio::test]
    async fn zero_sized_constraints_are_unsatisfiable() {
        let camera = SyntheticCamera::new();
        let err = camera.acquire(&constraints(0, 480)).await.err().expect("must fail");
        assert!(matches!(err, AcquireError::ConstraintsUnsatisfiable { .. }));
    }

    #[tokio::test]
    async fn native_zoom_applies_within_range_and_rejects_outside() {
        let camera = SyntheticCamera::new().with_zoom_range(ZoomRange { min: 1.0, max: 4.0, step: 0.1 });
        let stream = camera.acquire(&constraints(320, 240)).await.expect("acquire");
        let track = stream.video_track();

        track.apply_zoom(2.0).await.expect("in range");
        assert!(matches!(track.apply_zoom(9.0).await, Err(ZoomError::Rejected { .. })));
    }

    #[tokio::test]
    async fn grab_frame_fails_on_stopped_track() {
        let camera = SyntheticCamera::new();
        let stream = camera.acquire(&constraints(320, 240)).await.expect("acquire");
        let track = stream.video_track();
        track.stop();
        assert_eq!(track.grab_frame().await, Err(TrackError::NotLive));
    }

    #[tokio::test]
    async fn grab_frame_unsupported_without_the_capability() {
        let camera = SyntheticCamera::new().without_grab();
        let stream = camera.acquire(&constraints(320, 240)).await.expect("acquire");
        assert_eq!(
            stream.video_track().grab_frame().await,
            Err(TrackError::GrabUnsupported)
        );
    }

    #[tokio::test]
    async fn disabled_track_freezes_frame_sequence() {
        let camera = SyntheticCamera::new();
        let stream = camera.acquire(&constraints(16, 16)).await.expect("acquire");
        let track = stream.video_track();

        let a = track.current_frame().expect("frame");
        track.set_enabled(false);
        // Disabled: frozen on the last delivered frame.
        let b = track.current_frame().expect("frame");
        let c = track.current_frame().expect("frame");
        assert_eq!(a.data[2], b.data[2]);
        assert_eq!(b.data[2], c.data[2]);

        track.set_enabled(true);
        let d = track.current_frame().expect("frame");
        assert_ne!(c.data[2], d.data[2]);
    }

    #[tokio::test]
    async fn scene_drawable_follows_viewport_physical_size() {
        let camera = SyntheticCamera::new();
        let stream = camera.acquire(&constraints(1920, 1080)).await.expect("acquire");
        let scene = SyntheticCompositor
            .build_scene(stream.video_track(), Viewport::new(800, 600, 2.0))
            .expect("scene");

        assert_eq!(scene.drawable_size(), Resolution::new(1600, 1200));
        let pixels = scene.extract_pixels().expect("extract");
        assert_eq!(pixels.data.len(), 1600 * 1200 * 4);
    }

    #[tokio::test]
    async fn scene_extraction_fails_once_source_ends() {
        let camera = SyntheticCamera::new();
        let stream = camera.acquire(&constraints(64, 64)).await.expect("acquire");
        let track = stream.video_track();
        let scene = SyntheticCompositor
            .build_scene(Arc::clone(&track), Viewport::new(64, 64, 1.0))
            .expect("scene");

        track.stop();
        assert!(matches!(scene.extract_pixels(), Err(CompositorError::Extract { .. })));
    }

    #[test]
    fn raster_surface_resize_clears_contents() {
        let mut surface = SyntheticRasterSurface::new();
        surface.resize(Resolution::new(4, 4));
        surface.pixels[0] = 0xAB;
        surface.resize(Resolution::new(4, 4));
        assert_eq!(surface.pixels[0], 0);
        assert_eq!(surface.image_data().expected_len(), 64);
    }

    #[tokio::test]
    async fn manual_scheduler_delivers_pushed_timestamps_in_order() {
        let sched = ManualScheduler::new();
        sched.push(0);
        sched.push(30);
        assert_eq!(sched.next_frame().await, 0);
        assert_eq!(sched.next_frame().await, 30);
    }
}
