//! JSON bodies exchanged with the processing service.
use serde::{Deserialize, Serialize};

use crate::{FailureKind, JobState, JobStatus, ServiceError};

#[derive(Debug, Deserialize)]
pub(crate) struct UploadBody {
    pub(crate) task_id: Option<String>,
    #[serde(default)]
    pub(crate) needs_logo_choice: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusBody {
    status: String,
    progress: Option<f64>,
    stage: Option<String>,
    result: Option<ResultBody>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultBody {
    processed_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ZipBody {
    pub(crate) zip_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ZipRequestBody<'a> {
    pub(crate) filenames: &'a [String],
}

impl StatusBody {
    pub(crate) fn into_status(self) -> Result<JobStatus, ServiceError> {
        let state = match self.status.as_str() {
            "queued" => JobState::Queued,
            "processing" => JobState::Processing,
            "succeeded" => JobState::Succeeded,
            "failed" => JobState::Failed,
            "unknown" => {
                return Err(ServiceError::new(FailureKind::UnknownJob, "status unknown"));
            }
            other => {
                return Err(ServiceError::new(
                    FailureKind::Decode,
                    format!("unexpected job status {other:?}"),
                ));
            }
        };
        let result_url = self.result.and_then(|result| result.processed_image);
        let result_name = result_url.as_deref().and_then(last_segment);
        Ok(JobStatus {
            state,
            progress_percent: self.progress.map(to_percent),
            stage: self.stage,
            result_url,
            result_name,
            error: self.error,
        })
    }
}

/// Last path segment of an absolute or server-relative URL.
pub(crate) fn last_segment(raw: &str) -> Option<String> {
    let base = url::Url::parse("http://service.invalid/").ok()?;
    let parsed = base.join(raw).ok()?;
    parsed
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
}

fn to_percent(progress: f64) -> u8 {
    if progress.is_nan() {
        return 0;
    }
    (progress.clamp(0.0, 1.0) * 100.0).round() as u8
}
