use std::fmt;
use std::path::PathBuf;

/// Caller-side identifier of a selected file.
pub type FileId = u64;

/// Everything the upload form carries besides the file bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub watermark_type: u8,
    pub image_quality: String,
    pub burn_after_read: bool,
    pub logo_preference: Option<String>,
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The server queued the file under this job id.
    Accepted { job_id: String },
    /// The server detected a Xiaomi camera and wants a logo preference.
    NeedsLogoChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Processing,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub state: JobState,
    /// Progress in percent, clamped to 0..=100.
    pub progress_percent: Option<u8>,
    pub stage: Option<String>,
    pub result_url: Option<String>,
    /// Last path segment of `result_url`, query dropped.
    pub result_name: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadFinished {
        file_id: FileId,
        result: Result<UploadOutcome, ServiceError>,
    },
    StatusFetched {
        file_id: FileId,
        result: Result<JobStatus, ServiceError>,
    },
    ResultDownloaded {
        file_id: FileId,
        result: Result<PathBuf, ServiceError>,
    },
    ZipDownloaded {
        result: Result<PathBuf, ServiceError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Text to show the user: the server's own message when it sent one.
    pub fn user_message(&self) -> String {
        match &self.kind {
            FailureKind::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ServiceError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// Non-success status without a JSON error body.
    HttpStatus(u16),
    /// Non-success status with the server's `{"error": ...}` message.
    Rejected { status: u16, message: String },
    /// The status endpoint no longer knows the job.
    UnknownJob,
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Io,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected { status, message } => {
                write!(f, "rejected with {status}: {message}")
            }
            FailureKind::UnknownJob => write!(f, "unknown job"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "payload too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "unexpected response body"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
