//! `MediaStreamManager` — owns the hardware capture handle and its control
//! surface: acquisition, track access, native zoom, pause/resume, stop and
//! permission queries. At most one capture handle is live at a time.

use std::sync::Arc;

use tracing::{debug, info};
use viewfinder_core::errors::{AcquireError, TrackError};
use viewfinder_core::{
    CaptureConstraints, PermissionName, PermissionReport, PipelineError, RasterImage,
};
use viewfinder_platform::{CameraDevice, CaptureStream, VideoTrack};

pub struct MediaStreamManager {
    camera: Arc<dyn CameraDevice>,
    constraints: CaptureConstraints,
    stream: Option<Box<dyn CaptureStream>>,
    /// First video channel, resolved lazily on first access and memoized for
    /// the handle's lifetime. Re-derived after every new acquisition.
    track: Option<Arc<dyn VideoTrack>>,
}

impl MediaStreamManager {
    pub fn new(camera: Arc<dyn CameraDevice>, constraints: CaptureConstraints) -> Self {
        Self { camera, constraints, stream: None, track: None }
    }

    /// Replace the constraints used by the next `acquire`.
    pub fn set_constraints(&mut self, constraints: CaptureConstraints) {
        self.constraints = constraints;
    }

    pub fn constraints(&self) -> &CaptureConstraints {
        &self.constraints
    }

    /// Request a capture handle meeting the current constraints. On failure
    /// the error is returned as-is — no retry. Any previously held handle is
    /// released first so at most one is ever live.
    pub async fn acquire(&mut self) -> Result<(), AcquireError> {
        if self.stream.is_some() {
            debug!("releasing previous capture handle before re-acquiring");
            self.stop();
        }
        let stream = self.camera.acquire(&self.constraints).await?;
        self.stream = Some(stream);
        self.track = None;
        info!(
            "capture stream acquired ({}×{}, facing {})",
            self.constraints.width, self.constraints.height, self.constraints.facing_mode
        );
        Ok(())
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// The memoized video track. Accessing it before a successful `acquire`
    /// is a programmer error and fails loudly.
    pub fn track(&mut self) -> Result<Arc<dyn VideoTrack>, TrackError> {
        if let Some(track) = &self.track {
            return Ok(Arc::clone(track));
        }
        let stream = self.stream.as_ref().ok_or(TrackError::Unavailable)?;
        let track = stream.video_track();
        self.track = Some(Arc::clone(&track));
        Ok(track)
    }

    /// True iff the active track's capability descriptor advertises a zoom
    /// range.
    pub fn supports_native_zoom(&mut self) -> Result<bool, TrackError> {
        Ok(self.track()?.capabilities().zoom.is_some())
    }

    /// Apply zoom on the device itself. Best-effort: rejections come back to
    /// the caller so they can be surfaced on the error channel.
    pub async fn apply_native_zoom(&mut self, value: f64) -> Result<(), PipelineError> {
        let track = self.track()?;
        track.apply_zoom(value).await?;
        Ok(())
    }

    /// Disable the track without releasing the hardware handle. Frames stop
    /// flowing; no renegotiation is needed to resume.
    pub fn pause(&mut self) -> Result<(), TrackError> {
        self.track()?.set_enabled(false);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TrackError> {
        self.track()?.set_enabled(true);
        Ok(())
    }

    /// Release the hardware handle. Irreversible for this handle; subsequent
    /// use requires a fresh `acquire`. Idempotent.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            // Stop the track even if it was never lazily resolved.
            let track = self.track.take().unwrap_or_else(|| stream.video_track());
            track.stop();
            info!("capture stream released");
        }
    }

    /// Grab one frame straight from the track, bypassing the render surfaces.
    pub async fn grab_frame(&mut self) -> Result<RasterImage, TrackError> {
        self.track()?.grab_frame().await
    }

    /// Issue one permission query per name and collect each outcome
    /// independently. Never fails as a whole.
    pub async fn query_permissions(&self, names: &[PermissionName]) -> Vec<PermissionReport> {
        let mut reports = Vec::with_capacity(names.len());
        for &name in names {
            let outcome = self.camera.query_permission(name).await;
            reports.push(PermissionReport { name, outcome });
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewfinder_core::{PermissionState, Resolution, ZoomRange};
    use viewfinder_platform::synthetic::SyntheticCamera;
    use viewfinder_platform::TrackReadyState;

    fn manager(camera: SyntheticCamera) -> MediaStreamManager {
        let constraints =
            CaptureConstraints { width: 320, height: 240, ..CaptureConstraints::default() };
        MediaStreamManager::new(Arc::new(camera), constraints)
    }

    #[tokio::test]
    async fn track_access_before_acquire_fails_loudly() {
        let mut mgr = manager(SyntheticCamera::new());
        assert!(matches!(mgr.track(), Err(TrackError::Unavailable)));
    }

    #[tokio::test]
    async fn track_is_memoized_until_reacquisition() {
        let mut mgr = manager(SyntheticCamera::new());
        mgr.acquire().await.expect("acquire");

        let first = mgr.track().expect("track");
        let second = mgr.track().expect("track");
        assert!(Arc::ptr_eq(&first, &second));

        mgr.acquire().await.expect("re-acquire");
        let third = mgr.track().expect("track");
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[tokio::test]
    async fn reacquire_stops_the_previous_track() {
        let mut mgr = manager(SyntheticCamera::new());
        mgr.acquire().await.expect("acquire");
        let first = mgr.track().expect("track");

        mgr.acquire().await.expect("re-acquire");
        assert_eq!(first.ready_state(), TrackReadyState::Ended);
    }

    #[tokio::test]
    async fn pause_and_resume_toggle_the_track_without_release() {
        let mut mgr = manager(SyntheticCamera::new());
        mgr.acquire().await.expect("acquire");

        mgr.pause().expect("pause");
        assert!(!mgr.track().expect("track").is_enabled());
        mgr.resume().expect("resume");
        assert!(mgr.track().expect("track").is_enabled());
        assert!(mgr.has_stream());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_releases_the_handle() {
        let mut mgr = manager(SyntheticCamera::new());
        mgr.acquire().await.expect("acquire");
        let track = mgr.track().expect("track");

        mgr.stop();
        assert!(!mgr.has_stream());
        assert_eq!(track.ready_state(), TrackReadyState::Ended);

        // Second stop is a no-op, not a fault.
        mgr.stop();
        assert!(!mgr.has_stream());
        assert!(matches!(mgr.track(), Err(TrackError::Unavailable)));
    }

    #[tokio::test]
    async fn stop_releases_even_when_track_was_never_resolved() {
        let mut mgr = manager(SyntheticCamera::new());
        mgr.acquire().await.expect("acquire");
        mgr.stop();
        assert!(!mgr.has_stream());
    }

    #[tokio::test]
    async fn supports_native_zoom_reflects_capabilities() {
        let mut plain = manager(SyntheticCamera::new());
        plain.acquire().await.expect("acquire");
        assert!(!plain.supports_native_zoom().expect("query"));

        let mut zooming = manager(SyntheticCamera::new().with_zoom_range(ZoomRange::default()));
        zooming.acquire().await.expect("acquire");
        assert!(zooming.supports_native_zoom().expect("query"));
    }

    #[tokio::test]
    async fn set_constraints_applies_to_next_acquire() {
        let mut mgr = manager(SyntheticCamera::new());
        mgr.set_constraints(CaptureConstraints {
            width: 640,
            height: 360,
            ..CaptureConstraints::default()
        });
        mgr.acquire().await.expect("acquire");

        let frame = mgr.grab_frame().await.expect("grab");
        assert_eq!(frame.resolution(), Resolution::new(640, 360));
    }

    #[tokio::test]
    async fn permission_queries_settle_per_name() {
        let camera = SyntheticCamera::new()
            .with_permission(PermissionName::Notifications, PermissionState::Denied);
        let mgr = manager(camera);

        let reports = mgr
            .query_permissions(&[
                PermissionName::Camera,
                PermissionName::Geolocation,
                PermissionName::Notifications,
            ])
            .await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].outcome, Ok(PermissionState::Granted));
        // Geolocation was never configured — its failure is isolated.
        assert!(reports[1].outcome.is_err());
        assert_eq!(reports[2].outcome, Ok(PermissionState::Denied));
    }
}
