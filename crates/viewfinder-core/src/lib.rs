pub mod bus;
pub mod config;
pub mod errors;
pub mod snapshot;
pub mod types;

pub use bus::{Event, EventBus, Topic};
pub use config::{CaptureConstraints, PipelineConfig, RenderMode};
pub use errors::PipelineError;
pub use snapshot::{ExportOptions, SnapshotFile};
pub use types::*;
