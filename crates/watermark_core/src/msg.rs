use std::path::PathBuf;

use crate::{FileId, LogoPreference, ProcessOptions, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a new set of files.
    FilesSelected(Vec<PathBuf>),
    /// User changed style, quality, privacy or language settings.
    OptionsChanged(ProcessOptions),
    /// User asked to process the current selection.
    ProcessClicked,
    /// Upload endpoint accepted the file and returned a job id.
    UploadAccepted { file_id: FileId, job_id: String },
    /// Upload endpoint wants a logo preference before it will queue the file.
    UploadNeedsLogoChoice { file_id: FileId },
    /// User answered a logo prompt.
    LogoChosen {
        file_id: FileId,
        choice: LogoPreference,
    },
    /// Upload was rejected or never reached the server.
    UploadFailed { file_id: FileId, message: String },
    /// Status endpoint answered a poll.
    StatusReported {
        file_id: FileId,
        report: StatusReport,
    },
    /// Status poll did not produce a report. `expired` means the server no
    /// longer knows the job.
    PollFailed {
        file_id: FileId,
        message: String,
        expired: bool,
    },
    /// Processed image stored locally.
    ResultSaved { file_id: FileId, path: PathBuf },
    /// Processed image could not be fetched or stored.
    ResultSaveFailed { file_id: FileId, message: String },
    /// User clicked "download all".
    ZipRequested,
    /// Zip archive stored locally.
    ZipSaved { path: PathBuf },
    /// Zip archive could not be produced or stored.
    ZipFailed { message: String },
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

/// One status poll answer, already decoded from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: TaskStatus,
    /// Server progress in percent (0..=100).
    pub progress_percent: Option<u8>,
    pub stage: Option<String>,
    pub result_url: Option<String>,
    /// Server-side filename of `result_url`, used for the zip request.
    pub result_name: Option<String>,
    pub error: Option<String>,
}

impl StatusReport {
    pub fn with_status(status: TaskStatus) -> Self {
        Self {
            status,
            progress_percent: None,
            stage: None,
            result_url: None,
            result_name: None,
            error: None,
        }
    }
}
