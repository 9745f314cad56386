use thiserror::Error;

/// Why stream acquisition failed. Never retried automatically; surfaced to
/// the embedder via the `streamLoadError` topic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No camera device found")]
    DeviceNotFound,

    #[error("Constraints unsatisfiable: {reason}")]
    ConstraintsUnsatisfiable { reason: String },

    #[error("Stream acquisition failed: {reason}")]
    Unknown { reason: String },
}

impl AcquireError {
    /// Stable failure-kind identifier carried in the `streamLoadError` payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission-denied",
            Self::DeviceNotFound => "device-not-found",
            Self::ConstraintsUnsatisfiable { .. } => "constraints-unsatisfiable",
            Self::Unknown { .. } => "unknown",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoomError {
    #[error("Track does not support native zoom")]
    Unsupported,

    #[error("Native zoom rejected: {reason}")]
    Rejected { reason: String },
}

/// Track access errors. `Unavailable` is a programmer error (reading the
/// track before acquisition succeeded) and fails fast rather than recovering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    #[error("No video track available — acquire a stream first")]
    Unavailable,

    #[error("Track is not live")]
    NotLive,

    #[error("Track does not support direct frame grabs")]
    GrabUnsupported,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Failed to attach stream to video surface: {reason}")]
    Attach { reason: String },

    #[error("Video never became playable: {reason}")]
    NotPlayable { reason: String },

    #[error("Failed to draw frame: {reason}")]
    Draw { reason: String },

    #[error("Failed to encode surface contents: {reason}")]
    Encode { reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositorError {
    #[error("Failed to build compositor scene: {reason}")]
    SceneBuild { reason: String },

    #[error("Failed to extract drawable: {reason}")]
    Extract { reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Permission '{name}' not supported by this host")]
    Unsupported { name: String },

    #[error("Permission query failed: {reason}")]
    Query { reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Malformed data URL")]
    InvalidDataUrl,

    #[error("Failed to decode snapshot payload: {reason}")]
    Decode { reason: String },

    #[error("Failed to encode snapshot payload: {reason}")]
    Encode { reason: String },

    #[error("Unsupported export MIME type: {mime}")]
    UnsupportedMime { mime: String },
}

/// A fault raised by an event-bus handler. Isolated per handler — dispatch
/// to sibling handlers continues, and the fault is reported on the dedicated
/// error channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Event handler failed: {reason}")]
pub struct HandlerFault {
    pub reason: String,
}

impl HandlerFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl From<&str> for HandlerFault {
    fn from(reason: &str) -> Self {
        Self::new(reason)
    }
}

impl From<String> for HandlerFault {
    fn from(reason: String) -> Self {
        Self { reason }
    }
}

/// Top-level pipeline error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Acquisition failed: {0}")]
    Acquire(#[from] AcquireError),

    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Compositor error: {0}")]
    Compositor(#[from] CompositorError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Zoom error: {0}")]
    Zoom(#[from] ZoomError),

    #[error("Pipeline already initialized")]
    AlreadyInitialized,

    #[error("Pipeline is stopped")]
    Stopped,

    #[error("Pipeline is not rendering")]
    NotRendering,

    #[error("Operation is only valid on the CPU render path")]
    CpuPathRequired,

    #[error("Operation is only valid on the GPU render path")]
    GpuPathRequired,
}
