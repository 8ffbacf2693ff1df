use std::path::PathBuf;
use std::time::Duration;

use crate::{FileId, UploadParams};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the file to the upload endpoint.
    Upload {
        file_id: FileId,
        path: PathBuf,
        params: UploadParams,
    },
    /// Ask the status endpoint about a job after `delay`.
    PollStatus {
        file_id: FileId,
        job_id: String,
        delay: Duration,
    },
    /// Fetch a processed image and store it as `file_name`.
    DownloadResult {
        file_id: FileId,
        url: String,
        file_name: String,
    },
    /// The server needs the user to pick a logo for this file.
    AskLogoChoice { file_id: FileId, source_name: String },
    /// Ask the server to pack the given result files.
    RequestZip { filenames: Vec<String> },
    /// Every file of the batch reached a terminal state.
    BatchFinished {
        succeeded: usize,
        failed: usize,
        zip_available: bool,
    },
}
