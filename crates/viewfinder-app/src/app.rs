//! Demo run loop: wires the synthetic host through the full pipeline.
//!
//! # Environment
//! - `VIEWFINDER_RENDER_MODE` — `gpu` (default) or `cpu`
//! - `VIEWFINDER_NATIVE_ZOOM` — set to `1` to give the camera a native zoom
//!   range, so zoom delegates to the device instead of the render path
//! - `VIEWFINDER_RUN_MS` — how long to drive the frame loop (default 1000)

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};
use viewfinder_core::snapshot::ExportOptions;
use viewfinder_core::{
    Event, PermissionName, PipelineConfig, RenderMode, Topic, Viewport, Visibility, ZoomRange,
};
use viewfinder_pipeline::RenderPipeline;
use viewfinder_platform::synthetic::{SyntheticCamera, SyntheticPlatform};

pub async fn run() -> Result<()> {
    let render_mode = match std::env::var("VIEWFINDER_RENDER_MODE").as_deref() {
        Ok("cpu") => RenderMode::Cpu,
        _ => RenderMode::Gpu,
    };
    let native_zoom = std::env::var("VIEWFINDER_NATIVE_ZOOM").as_deref() == Ok("1");
    let run_ms: u64 = std::env::var("VIEWFINDER_RUN_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    info!("render mode: {render_mode}, native zoom: {native_zoom}");

    // ── Build the synthetic host ──────────────────────────────────────────
    let mut camera = SyntheticCamera::new();
    if native_zoom {
        camera = camera.with_zoom_range(ZoomRange::default());
    }
    let platform = SyntheticPlatform::new(camera, Viewport::new(800, 600, 2.0));
    let visibility = platform.visibility_switch();

    let config = PipelineConfig { render_mode, ..PipelineConfig::default() };
    let mut pipeline = RenderPipeline::new(Box::new(platform), config);

    // ── Subscribe to pipeline events ──────────────────────────────────────
    pipeline.events_mut().on(
        Topic::StreamLoad,
        |_| {
            info!("stream acquired");
            Ok(())
        },
        false,
    );
    pipeline.events_mut().on(
        Topic::InitDone,
        |_| {
            info!("render path committed and running");
            Ok(())
        },
        false,
    );
    pipeline.events_mut().on(
        Topic::StreamLoadError,
        |event| {
            if let Event::StreamLoadError { error } = event {
                warn!("stream load failed: {}", error.kind());
            }
            Ok(())
        },
        false,
    );
    pipeline.events_mut().on(
        Topic::Error,
        |event| {
            if let Event::Error { message } = event {
                warn!("pipeline fault: {message}");
            }
            Ok(())
        },
        false,
    );

    // ── Permission probe, then initialize ─────────────────────────────────
    let reports = pipeline
        .media()
        .query_permissions(&[PermissionName::Camera, PermissionName::Geolocation])
        .await;
    for report in reports {
        match report.outcome {
            Ok(state) => info!("permission {}: {state:?}", report.name),
            Err(e) => warn!("permission {}: {e}", report.name),
        }
    }

    pipeline.initialize().await?;
    info!("native video size: {}", pipeline.native_size());

    // ── Live zoom ─────────────────────────────────────────────────────────
    pipeline.set_zoom(2.0).await?;
    info!("zoom set to {}", pipeline.zoom());

    // ── Snapshot / extraction ─────────────────────────────────────────────
    match render_mode {
        RenderMode::Cpu => {
            let token = pipeline.tick_token();
            pipeline.tick(token, 0)?;
            let readback = pipeline.canvas_image_data()?;
            info!("live readback: {} ({} bytes)", readback.resolution(), readback.data.len());

            let url = pipeline.shot()?;
            info!("snapshot: {} chars as data-URL", url.len());

            let file = pipeline.snapshot_file(&ExportOptions::default())?;
            info!("export: {} ({} bytes, {})", file.file_name, file.len(), file.mime);
        }
        RenderMode::Gpu => {
            let pixels = pipeline.extract_pixels()?;
            info!("drawable extraction: {} ({} bytes)", pixels.resolution(), pixels.data.len());

            let url = pipeline.extract_data_url()?;
            info!("drawable as data-URL: {} chars", url.len());
        }
    }

    // Direct grab, bypassing the render surfaces entirely.
    match pipeline.media_mut().grab_frame().await {
        Ok(frame) => info!("direct grab: {}", frame.resolution()),
        Err(e) => warn!("direct grab unavailable: {e}"),
    }

    // ── Drive the frame loop, with a hide/show cycle, then stop ───────────
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        let third = Duration::from_millis(run_ms / 3);
        tokio::time::sleep(third).await;
        info!("simulating host hide");
        visibility.set(Visibility::Hidden);
        tokio::time::sleep(third).await;
        info!("simulating host show");
        visibility.set(Visibility::Visible);
        tokio::time::sleep(third).await;
        let _ = stop_tx.send(()).await;
    });

    pipeline.drive(&mut stop_rx).await?;
    info!("pipeline state: {:?}", pipeline.state());
    Ok(())
}
