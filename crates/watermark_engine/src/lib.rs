//! Watermark engine: HTTP client for the processing service and effect execution.
mod client;
mod engine;
mod filename;
mod persist;
mod types;
mod wire;

pub use client::{ReqwestService, ServiceSettings, WatermarkService};
pub use engine::EngineHandle;
pub use filename::sanitize_file_name;
pub use persist::{ensure_output_dir, PersistError, ResultStore};
pub use types::{
    EngineEvent, FailureKind, FileId, JobState, JobStatus, ServiceError, UploadOutcome,
    UploadRequest,
};
