//! `RenderPipeline` — orchestrates acquisition, render-path commitment, the
//! CPU frame tick, zoom application, visibility-driven suspension, snapshots
//! and teardown.
//!
//! State machine:
//!
//! ```text
//! Uninitialized → Acquiring → { Ready | Failed } → Rendering → Stopped
//! ```
//!
//! `Failed` is terminal unless the embedder calls [`RenderPipeline::initialize`]
//! again; `Stopped` is terminal for the instance. All state lives on a single
//! cooperative thread of control — no locks anywhere in the core.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use viewfinder_core::errors::{AcquireError, SurfaceError};
use viewfinder_core::snapshot::{self, ExportOptions, SnapshotFile};
use viewfinder_core::{
    Event, EventBus, PipelineConfig, PipelineError, RasterImage, RenderMode, Resolution,
    Visibility,
};
use viewfinder_platform::{Platform, RasterSurface, VideoSurface};

use crate::path::{ActivePath, CpuPath, GpuPath};
use crate::stream::MediaStreamManager;

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Acquiring,
    Ready,
    Failed,
    Rendering,
    Stopped,
}

/// What a single frame tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was copied into the live surface.
    Drew,
    /// Rate-limited (interval not yet elapsed) or not on the CPU path.
    Skipped,
    /// DrawEnabled is clear — the tick must not reschedule itself.
    Halted,
    /// The tick belongs to an earlier generation; a stop or re-initialize
    /// happened after it was scheduled. No side effects were performed.
    Stale,
}

// ── RenderPipeline ────────────────────────────────────────────────────────────

pub struct RenderPipeline {
    platform: Box<dyn Platform>,
    config: PipelineConfig,
    bus: EventBus,
    media: MediaStreamManager,
    video: Box<dyn VideoSurface>,
    state: PipelineState,
    /// Committed once, at the moment the stream becomes playable.
    path: Option<ActivePath>,
    /// Current zoom value. Which of the three enforcement mechanisms applies
    /// is decided per `set_zoom` call, not re-evaluated continuously.
    zoom: f64,
    /// Gates CPU tick rescheduling. Cleared on hide and on stop.
    draw_enabled: bool,
    /// Bumped on every (re-)commitment and on stop so that a tick scheduled
    /// before the transition can detect staleness and exit without effects.
    generation: u64,
    visibility_rx: Option<tokio::sync::watch::Receiver<Visibility>>,
    /// Most recent snapshot payload.
    last_snapshot: Option<String>,
}

impl RenderPipeline {
    pub fn new(platform: Box<dyn Platform>, config: PipelineConfig) -> Self {
        let media = MediaStreamManager::new(platform.camera(), config.constraints.clone());
        let video = platform.video_surface();
        let zoom = config.constraints.zoom;
        Self {
            platform,
            config,
            bus: EventBus::new(),
            media,
            video,
            state: PipelineState::Uninitialized,
            path: None,
            zoom,
            draw_enabled: false,
            generation: 0,
            visibility_rx: None,
            last_snapshot: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Acquire the stream, wait for it to become playable and commit the
    /// render path. Emits `streamLoad` / `initdone`, or `streamLoadError`
    /// and transitions to `Failed`. No internal retry — recovery is calling
    /// this again.
    pub async fn initialize(&mut self) -> Result<(), PipelineError> {
        match self.state {
            PipelineState::Uninitialized | PipelineState::Failed => {}
            PipelineState::Stopped => return Err(PipelineError::Stopped),
            _ => return Err(PipelineError::AlreadyInitialized),
        }

        // Observe visibility first so a hide during acquisition is not lost.
        self.visibility_rx = Some(self.platform.visibility().subscribe());

        // CPU-path raster surfaces are allocated up front, before the device
        // is touched.
        let mut surfaces = match self.config.render_mode {
            RenderMode::Cpu => {
                Some((self.platform.raster_surface(), self.platform.raster_surface()))
            }
            RenderMode::Gpu => None,
        };

        self.state = PipelineState::Acquiring;
        if let Err(error) = self.media.acquire().await {
            self.state = PipelineState::Failed;
            warn!("stream acquisition failed: {error}");
            self.bus.emit(Event::StreamLoadError { error: error.clone() });
            return Err(error.into());
        }
        self.bus.emit(Event::StreamLoad);

        let track = self.media.track()?;
        if let Err(e) = self.video.attach(Arc::clone(&track)) {
            return Err(self.fail_before_playable(e));
        }
        let native = match self.video.wait_playable().await {
            Ok(native) => native,
            Err(e) => return Err(self.fail_before_playable(e)),
        };
        self.state = PipelineState::Ready;
        info!("stream playable at {native}");

        // Render-path commitment: once, irreversible.
        let path = match surfaces.take() {
            Some((live, snapshot)) => {
                ActivePath::Cpu(CpuPath::new(live, snapshot, self.config.min_draw_interval_ms))
            }
            None => {
                let viewport = self.platform.viewport();
                match GpuPath::commit(self.platform.compositor().as_ref(), track, viewport) {
                    Ok(gpu) => ActivePath::Gpu(gpu),
                    Err(e) => {
                        self.state = PipelineState::Failed;
                        warn!("compositor scene build failed: {e}");
                        self.bus.emit(Event::Error { message: e.to_string() });
                        return Err(e.into());
                    }
                }
            }
        };

        self.path = Some(path);
        self.draw_enabled = true;
        self.generation = self.generation.wrapping_add(1);
        self.state = PipelineState::Rendering;
        info!("render path committed: {}", self.config.render_mode);
        self.bus.emit(Event::InitDone);
        Ok(())
    }

    /// Attach/playability failures end the same way acquisition failures do:
    /// `Failed` state plus a `streamLoadError` emission.
    fn fail_before_playable(&mut self, e: SurfaceError) -> PipelineError {
        self.state = PipelineState::Failed;
        warn!("stream never became playable: {e}");
        self.bus
            .emit(Event::StreamLoadError { error: AcquireError::Unknown { reason: e.to_string() } });
        e.into()
    }

    /// Teardown: clears DrawEnabled, cancels pending ticks via the
    /// generation counter, releases the compositor scene (GPU path), stops
    /// the hardware track and removes the visibility observer. Idempotent.
    pub fn stop(&mut self) {
        self.draw_enabled = false;
        self.generation = self.generation.wrapping_add(1);
        if let Some(path) = self.path.take() {
            if matches!(path, ActivePath::Gpu(_)) {
                debug!("releasing compositor scene");
            }
            // Scene/surface resources are scoped to the path value.
            drop(path);
        }
        self.media.stop();
        self.visibility_rx = None;
        if self.state != PipelineState::Stopped {
            info!("pipeline stopped");
        }
        self.state = PipelineState::Stopped;
    }

    // ── Frame tick ────────────────────────────────────────────────────────

    /// Token identifying the current tick generation. A tick scheduled with
    /// an old token is stale and performs no work.
    pub fn tick_token(&self) -> u64 {
        self.generation
    }

    /// One frame-tick body, driven once per display refresh. Draws only when
    /// the minimum inter-draw interval has elapsed; `Halted` means the
    /// caller must not reschedule. A tick already in flight when DrawEnabled
    /// clears still completes — only the next reschedule is prevented.
    pub fn tick(&mut self, token: u64, timestamp_ms: u64) -> Result<TickOutcome, PipelineError> {
        if token != self.generation {
            return Ok(TickOutcome::Stale);
        }
        if !self.draw_enabled {
            return Ok(TickOutcome::Halted);
        }
        let Some(cpu) = self.path.as_mut().and_then(ActivePath::as_cpu_mut) else {
            // The GPU compositor renders on its own; nothing to do per tick.
            return Ok(TickOutcome::Skipped);
        };
        match cpu.tick(timestamp_ms, self.video.as_ref()) {
            Ok(true) => Ok(TickOutcome::Drew),
            Ok(false) => Ok(TickOutcome::Skipped),
            Err(e) => {
                self.bus.emit(Event::Error { message: e.to_string() });
                Err(e.into())
            }
        }
    }

    /// Drive the pipeline until a stop request arrives: schedules CPU ticks
    /// through the platform's frame scheduler and applies visibility
    /// transitions. Visibility gates only the CPU tick; the GPU compositor
    /// keeps rendering while hidden.
    pub async fn drive(&mut self, stop_rx: &mut mpsc::Receiver<()>) -> Result<(), PipelineError> {
        self.require_rendering()?;
        let scheduler = self.platform.scheduler();
        let token = self.generation;
        let mut vis_rx = self.visibility_rx.clone().ok_or(PipelineError::NotRendering)?;
        let mut vis_alive = true;

        loop {
            tokio::select! {
                _ = stop_rx.recv() => {
                    info!("stop requested");
                    self.stop();
                    break;
                }
                changed = vis_rx.changed(), if vis_alive => {
                    match changed {
                        Ok(()) => {
                            let visibility = *vis_rx.borrow_and_update();
                            self.handle_visibility(visibility);
                        }
                        // Signal source gone; keep rendering, stop polling.
                        Err(_) => vis_alive = false,
                    }
                }
                timestamp = scheduler.next_frame() => {
                    match self.tick(token, timestamp) {
                        Ok(TickOutcome::Stale) => break,
                        Ok(_) => {}
                        Err(e) => warn!("frame tick failed: {e}"),
                    }
                }
            }
            if self.state == PipelineState::Stopped {
                break;
            }
        }
        Ok(())
    }

    /// Apply a visibility transition: hidden clears DrawEnabled (the CPU
    /// tick stops rescheduling; the hardware track stays live), visible
    /// restores it.
    pub fn handle_visibility(&mut self, visibility: Visibility) {
        if self.state != PipelineState::Rendering {
            return;
        }
        match visibility {
            Visibility::Hidden => {
                debug!("host hidden — draw disabled");
                self.draw_enabled = false;
            }
            Visibility::Visible => {
                debug!("host visible — draw enabled");
                self.draw_enabled = true;
            }
        }
    }

    // ── Zoom ──────────────────────────────────────────────────────────────

    /// Set the zoom value. Resolution order, evaluated once per call:
    /// native track zoom, else compositor sprite scale (GPU path), else the
    /// value is only stored — the CPU draw tick never consults it, so zoom
    /// has no visible effect on that path without native support.
    pub async fn set_zoom(&mut self, value: f64) -> Result<(), PipelineError> {
        self.require_rendering()?;
        if value == self.zoom {
            return Ok(());
        }
        self.zoom = value;

        if self.media.supports_native_zoom()? {
            // Best-effort: failures are surfaced on the error channel
            // instead of being swallowed.
            if let Err(e) = self.media.apply_native_zoom(value).await {
                warn!("native zoom application failed: {e}");
                self.bus.emit(Event::Error { message: e.to_string() });
            }
            return Ok(());
        }
        match self.path.as_mut() {
            Some(ActivePath::Gpu(gpu)) => gpu.set_zoom(value),
            _ => debug!("zoom {value} stored; no enforcement mechanism on this path"),
        }
        Ok(())
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    // ── Snapshot & export ─────────────────────────────────────────────────

    /// Capture a still image: a fresh frame is drawn into the dedicated
    /// snapshot surface (resized to the video's native resolution) and
    /// encoded as a lossless PNG data-URL. Continuous rendering on the live
    /// surface is never interrupted. CPU path only — GPU extraction goes
    /// through [`RenderPipeline::extract_data_url`].
    pub fn shot(&mut self) -> Result<String, PipelineError> {
        self.require_rendering()?;
        let Some(cpu) = self.path.as_mut().and_then(ActivePath::as_cpu_mut) else {
            return Err(PipelineError::CpuPathRequired);
        };
        let url = cpu.shot(self.video.as_ref())?;
        self.last_snapshot = Some(url.clone());
        Ok(url)
    }

    /// Capture a snapshot and wrap it into a file-like payload with
    /// caller-chosen quality, MIME type and filename.
    pub fn snapshot_file(&mut self, opts: &ExportOptions) -> Result<SnapshotFile, PipelineError> {
        let url = self.shot()?;
        Ok(snapshot::export_file(&url, opts)?)
    }

    /// Raw RGBA readback of the live surface at its current dimensions. CPU
    /// path only; GPU readback must use [`RenderPipeline::extract_pixels`].
    pub fn canvas_image_data(&self) -> Result<RasterImage, PipelineError> {
        self.require_rendering()?;
        let cpu = self
            .path
            .as_ref()
            .and_then(ActivePath::as_cpu)
            .ok_or(PipelineError::CpuPathRequired)?;
        Ok(cpu.image_data())
    }

    /// GPU path: raw pixel buffer of the compositor drawable at its current
    /// size.
    pub fn extract_pixels(&self) -> Result<RasterImage, PipelineError> {
        Ok(self.gpu()?.extract_pixels()?)
    }

    /// GPU path: render the drawable into a fresh raster surface.
    pub fn extract_surface(&self) -> Result<Box<dyn RasterSurface>, PipelineError> {
        Ok(self.gpu()?.extract_surface()?)
    }

    /// GPU path: encoded string of the drawable.
    pub fn extract_data_url(&self) -> Result<String, PipelineError> {
        Ok(self.gpu()?.extract_data_url()?)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn draw_enabled(&self) -> bool {
        self.draw_enabled
    }

    /// The native size the video reported when it became playable, as
    /// currently exposed by the video surface.
    pub fn native_size(&self) -> Resolution {
        self.video.native_size()
    }

    /// Most recent snapshot payload, if any.
    pub fn last_snapshot(&self) -> Option<&str> {
        self.last_snapshot.as_deref()
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn media(&self) -> &MediaStreamManager {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut MediaStreamManager {
        &mut self.media
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn require_rendering(&self) -> Result<(), PipelineError> {
        match self.state {
            PipelineState::Rendering => Ok(()),
            PipelineState::Stopped => Err(PipelineError::Stopped),
            _ => Err(PipelineError::NotRendering),
        }
    }

    fn gpu(&self) -> Result<&GpuPath, PipelineError> {
        self.require_rendering()?;
        self.path
            .as_ref()
            .and_then(ActivePath::as_gpu)
            .ok_or(PipelineError::GpuPathRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use viewfinder_core::errors::AcquireError;
    use viewfinder_core::{CaptureConstraints, Topic, Viewport, ZoomRange};
    use viewfinder_platform::synthetic::{ManualScheduler, SyntheticCamera, SyntheticPlatform};

    fn config(mode: RenderMode, width: u32, height: u32) -> PipelineConfig {
        PipelineConfig {
            render_mode: mode,
            min_draw_interval_ms: 90,
            constraints: CaptureConstraints { width, height, ..CaptureConstraints::default() },
        }
    }

    fn build(mode: RenderMode, camera: SyntheticCamera, width: u32, height: u32) -> RenderPipeline {
        let platform = SyntheticPlatform::new(camera, Viewport::new(800, 600, 2.0));
        RenderPipeline::new(Box::new(platform), config(mode, width, height))
    }

    fn event_counter(
        pipeline: &mut RenderPipeline,
        topic: Topic,
    ) -> Rc<RefCell<Vec<Event>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = Rc::clone(&seen);
        pipeline.events_mut().on(
            topic,
            move |event| {
                seen2.borrow_mut().push(event.clone());
                Ok(())
            },
            false,
        );
        seen
    }

    #[tokio::test]
    async fn failed_acquisition_emits_exactly_one_stream_load_error() {
        let camera = SyntheticCamera::new().failing_with(AcquireError::DeviceNotFound);
        let mut pipeline = build(RenderMode::Cpu, camera, 640, 480);
        let errors = event_counter(&mut pipeline, Topic::StreamLoadError);
        let initdone = event_counter(&mut pipeline, Topic::InitDone);

        let err = pipeline.initialize().await.expect_err("must fail");
        assert!(matches!(err, PipelineError::Acquire(AcquireError::DeviceNotFound)));
        assert_eq!(pipeline.state(), PipelineState::Failed);

        assert_eq!(errors.borrow().len(), 1);
        match &errors.borrow()[0] {
            Event::StreamLoadError { error } => assert!(!error.kind().is_empty()),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(initdone.borrow().is_empty());
    }

    #[tokio::test]
    async fn successful_init_emits_one_initdone_and_renders() {
        let mut pipeline = build(RenderMode::Cpu, SyntheticCamera::new(), 640, 480);
        let loads = event_counter(&mut pipeline, Topic::StreamLoad);
        let initdone = event_counter(&mut pipeline, Topic::InitDone);

        pipeline.initialize().await.expect("initialize");

        assert_eq!(pipeline.state(), PipelineState::Rendering);
        assert!(pipeline.draw_enabled());
        assert_eq!(loads.borrow().len(), 1);
        assert_eq!(initdone.borrow().len(), 1);
    }

    #[tokio::test]
    async fn initdone_is_replayed_to_late_subscribers() {
        let mut pipeline = build(RenderMode::Gpu, SyntheticCamera::new(), 640, 480);
        pipeline.initialize().await.expect("initialize");

        let late = event_counter(&mut pipeline, Topic::InitDone);
        assert_eq!(late.borrow().as_slice(), [Event::InitDone]);
    }

    #[tokio::test]
    async fn failed_pipeline_can_be_initialized_again() {
        let camera = SyntheticCamera::new().failing_with(AcquireError::PermissionDenied);
        let mut pipeline = build(RenderMode::Cpu, camera, 640, 480);

        pipeline.initialize().await.expect_err("first attempt fails");
        assert_eq!(pipeline.state(), PipelineState::Failed);

        // Not AlreadyInitialized — Failed is re-enterable.
        let err = pipeline.initialize().await.expect_err("still failing");
        assert!(matches!(err, PipelineError::Acquire(AcquireError::PermissionDenied)));
    }

    #[tokio::test]
    async fn initialize_twice_is_rejected() {
        let mut pipeline = build(RenderMode::Cpu, SyntheticCamera::new(), 640, 480);
        pipeline.initialize().await.expect("initialize");
        assert!(matches!(
            pipeline.initialize().await,
            Err(PipelineError::AlreadyInitialized)
        ));
    }

    #[tokio::test]
    async fn cpu_tick_respects_the_minimum_interval() {
        let mut pipeline = build(RenderMode::Cpu, SyntheticCamera::new(), 1920, 1080);
        pipeline.initialize().await.expect("initialize");
        let token = pipeline.tick_token();

        // t=0 draws; live surface snaps to the video's native resolution.
        assert_eq!(pipeline.tick(token, 0).expect("tick"), TickOutcome::Drew);
        let cpu = pipeline.path.as_ref().and_then(ActivePath::as_cpu).expect("cpu path");
        assert_eq!(cpu.live_size(), Resolution::new(1920, 1080));

        // t=30ms with a 90ms minimum interval does not draw.
        assert_eq!(pipeline.tick(token, 30).expect("tick"), TickOutcome::Skipped);

        // t=95ms draws again.
        assert_eq!(pipeline.tick(token, 95).expect("tick"), TickOutcome::Drew);
    }

    #[tokio::test]
    async fn shot_uses_the_snapshot_surface_and_leaves_the_live_surface_alone() {
        let mut pipeline = build(RenderMode::Cpu, SyntheticCamera::new(), 320, 240);
        pipeline.initialize().await.expect("initialize");
        let token = pipeline.tick_token();
        pipeline.tick(token, 0).expect("tick");

        let live_before = pipeline.canvas_image_data().expect("readback");
        let url = pipeline.shot().expect("shot");
        assert!(url.starts_with("data:image/png;base64,"));

        let cpu = pipeline.path.as_ref().and_then(ActivePath::as_cpu).expect("cpu path");
        assert_eq!(cpu.snapshot_size(), Resolution::new(320, 240));

        let live_after = pipeline.canvas_image_data().expect("readback");
        assert_eq!(live_before, live_after);
        assert_eq!(pipeline.last_snapshot(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn snapshot_file_export_uses_caller_parameters() {
        let mut pipeline = build(RenderMode::Cpu, SyntheticCamera::new(), 64, 48);
        pipeline.initialize().await.expect("initialize");

        let opts = ExportOptions { file_name: "frame.jpg".into(), ..ExportOptions::default() };
        let file = pipeline.snapshot_file(&opts).expect("export");
        assert_eq!(file.file_name, "frame.jpg");
        assert_eq!(file.mime, "image/jpeg");
        assert!(!file.is_empty());
    }

    #[tokio::test]
    async fn gpu_drawable_follows_viewport_and_pixel_ratio() {
        // Viewport 800×600 at DPR 2 → 1600×1200 physical drawable.
        let mut pipeline = build(RenderMode::Gpu, SyntheticCamera::new(), 1920, 1080);
        pipeline.initialize().await.expect("initialize");

        let pixels = pipeline.extract_pixels().expect("extract");
        assert_eq!(pixels.data.len(), 1600 * 1200 * 4);
        assert_eq!(pixels.resolution(), Resolution::new(1600, 1200));

        let surface = pipeline.extract_surface().expect("extract surface");
        assert_eq!(surface.size(), Resolution::new(1600, 1200));

        let url = pipeline.extract_data_url().expect("extract url");
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn path_specific_operations_reject_the_other_path() {
        let mut gpu = build(RenderMode::Gpu, SyntheticCamera::new(), 640, 480);
        gpu.initialize().await.expect("initialize");
        assert!(matches!(gpu.shot(), Err(PipelineError::CpuPathRequired)));
        assert!(matches!(gpu.canvas_image_data(), Err(PipelineError::CpuPathRequired)));

        let mut cpu = build(RenderMode::Cpu, SyntheticCamera::new(), 640, 480);
        cpu.initialize().await.expect("initialize");
        assert!(matches!(cpu.extract_pixels(), Err(PipelineError::GpuPathRequired)));
    }

    #[tokio::test]
    async fn native_zoom_takes_precedence_and_surfaces_rejections() {
        let camera = SyntheticCamera::new()
            .with_zoom_range(ZoomRange { min: 1.0, max: 4.0, step: 0.1 });
        let mut pipeline = build(RenderMode::Gpu, camera, 640, 480);
        pipeline.initialize().await.expect("initialize");
        let faults = event_counter(&mut pipeline, Topic::Error);

        pipeline.set_zoom(2.0).await.expect("zoom");
        // Native zoom handled it — the compositor sprite is untouched.
        let gpu = pipeline.path.as_ref().and_then(ActivePath::as_gpu).expect("gpu path");
        assert_eq!(gpu.zoom(), 1.0);
        assert!(faults.borrow().is_empty());

        // Out of range: the device rejects, and the failure is surfaced on
        // the error channel instead of being swallowed.
        pipeline.set_zoom(99.0).await.expect("best-effort");
        assert_eq!(faults.borrow().len(), 1);
    }

    #[tokio::test]
    async fn gpu_zoom_rescales_the_sprite_without_native_support() {
        let mut pipeline = build(RenderMode::Gpu, SyntheticCamera::new(), 640, 480);
        pipeline.initialize().await.expect("initialize");

        pipeline.set_zoom(2.5).await.expect("zoom");
        let gpu = pipeline.path.as_ref().and_then(ActivePath::as_gpu).expect("gpu path");
        assert_eq!(gpu.zoom(), 2.5);
        assert_eq!(pipeline.zoom(), 2.5);
    }

    #[tokio::test]
    async fn cpu_zoom_is_stored_but_never_consulted_by_the_tick() {
        let mut pipeline = build(RenderMode::Cpu, SyntheticCamera::new(), 320, 240);
        pipeline.initialize().await.expect("initialize");
        let token = pipeline.tick_token();

        pipeline.set_zoom(3.0).await.expect("zoom");
        assert_eq!(pipeline.zoom(), 3.0);

        // The draw tick still copies at native size — zoom has no visible
        // effect under CPU-without-native-zoom.
        pipeline.tick(token, 0).expect("tick");
        let cpu = pipeline.path.as_ref().and_then(ActivePath::as_cpu).expect("cpu path");
        assert_eq!(cpu.live_size(), Resolution::new(320, 240));
    }

    #[tokio::test]
    async fn setting_the_same_zoom_value_is_a_no_op() {
        let camera = SyntheticCamera::new()
            .with_zoom_range(ZoomRange { min: 1.0, max: 4.0, step: 0.1 });
        let mut pipeline = build(RenderMode::Gpu, camera, 640, 480);
        pipeline.initialize().await.expect("initialize");
        let faults = event_counter(&mut pipeline, Topic::Error);

        // Current value is the constraints hint (1.0).
        pipeline.set_zoom(1.0).await.expect("no-op");
        assert!(faults.borrow().is_empty());
    }

    #[tokio::test]
    async fn visibility_transitions_gate_the_cpu_tick() {
        let mut pipeline = build(RenderMode::Cpu, SyntheticCamera::new(), 320, 240);
        pipeline.initialize().await.expect("initialize");
        let token = pipeline.tick_token();

        pipeline.handle_visibility(Visibility::Hidden);
        assert!(!pipeline.draw_enabled());
        assert_eq!(pipeline.tick(token, 0).expect("tick"), TickOutcome::Halted);
        // The hardware track stays live and untouched.
        assert!(pipeline.media().has_stream());

        pipeline.handle_visibility(Visibility::Visible);
        assert_eq!(pipeline.tick(token, 10).expect("tick"), TickOutcome::Drew);
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_cancels_stale_ticks() {
        let mut pipeline = build(RenderMode::Cpu, SyntheticCamera::new(), 320, 240);
        pipeline.initialize().await.expect("initialize");
        let token = pipeline.tick_token();

        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
        assert!(!pipeline.draw_enabled());
        assert!(!pipeline.media().has_stream());

        // A tick scheduled before the stop detects staleness and does nothing.
        assert_eq!(pipeline.tick(token, 500).expect("tick"), TickOutcome::Stale);

        // Second stop: same end state, no fault.
        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
        assert!(!pipeline.draw_enabled());

        // Stopped is terminal for the instance.
        assert!(matches!(pipeline.initialize().await, Err(PipelineError::Stopped)));
    }

    #[tokio::test]
    async fn gpu_extraction_still_works_while_hidden() {
        // Visibility gates only the CPU tick, not the compositor.
        let mut pipeline = build(RenderMode::Gpu, SyntheticCamera::new(), 640, 480);
        pipeline.initialize().await.expect("initialize");

        pipeline.handle_visibility(Visibility::Hidden);
        assert!(pipeline.extract_pixels().is_ok());
    }

    #[tokio::test]
    async fn drive_loop_processes_ticks_and_stop_requests() {
        let scheduler = Arc::new(ManualScheduler::new());
        let platform =
            SyntheticPlatform::new(SyntheticCamera::new(), Viewport::new(100, 100, 1.0))
                .with_scheduler(Arc::clone(&scheduler) as _);
        let mut pipeline =
            RenderPipeline::new(Box::new(platform), config(RenderMode::Cpu, 64, 48));
        pipeline.initialize().await.expect("initialize");

        scheduler.push(0);
        scheduler.push(200);

        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        stop_tx.send(()).await.expect("send stop");

        pipeline.drive(&mut stop_rx).await.expect("drive");
        assert_eq!(pipeline.state(), PipelineState::Stopped);
    }
}
