use std::io;
use std::time::Duration;

use watermark_core::{
    texts, Effect, FileId, Lang, LogoPreference, Msg, StatusReport, TaskStatus, UploadParams,
};
use watermark_engine::{
    EngineEvent, EngineHandle, FailureKind, JobState, JobStatus, UploadOutcome, UploadRequest,
};
use watermark_logging::{wm_info, wm_warn};

use super::prompt::ask_logo_choice;

/// Executes core effects against the engine and turns engine events back
/// into core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    zip_on_finish: bool,
    lang: Lang,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, zip_on_finish: bool, lang: Lang) -> Self {
        Self {
            engine,
            zip_on_finish,
            lang,
        }
    }

    /// Runs `effects`; returns messages that are known right away.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut immediate = Vec::new();
        for effect in effects {
            match effect {
                Effect::Upload {
                    file_id,
                    path,
                    params,
                } => {
                    wm_info!("Upload file_id={} path={:?}", file_id, path);
                    self.engine.upload(file_id, upload_request(path, &params));
                }
                Effect::PollStatus {
                    file_id,
                    job_id,
                    delay,
                } => {
                    self.engine.poll(file_id, job_id, delay);
                }
                Effect::DownloadResult {
                    file_id,
                    url,
                    file_name,
                } => {
                    wm_info!("Download file_id={} url={}", file_id, url);
                    self.engine.download(file_id, url, file_name);
                }
                Effect::AskLogoChoice {
                    file_id,
                    source_name,
                } => {
                    let stdin = io::stdin();
                    let mut input = stdin.lock();
                    let mut output = io::stdout();
                    let choice =
                        ask_logo_choice(&mut input, &mut output, texts(self.lang), &source_name);
                    immediate.push(logo_answer(file_id, choice));
                }
                Effect::RequestZip { filenames } => {
                    wm_info!("RequestZip files={}", filenames.len());
                    self.engine.request_zip(filenames);
                }
                Effect::BatchFinished {
                    succeeded,
                    failed,
                    zip_available,
                } => {
                    wm_info!(
                        "Batch finished succeeded={} failed={} zip_available={}",
                        succeeded,
                        failed,
                        zip_available
                    );
                    immediate.extend(after_batch(self.zip_on_finish, zip_available));
                }
            }
        }
        immediate
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

/// `--zip` asks for the archive as soon as there is something to pack.
pub(crate) fn after_batch(zip_on_finish: bool, zip_available: bool) -> Option<Msg> {
    (zip_on_finish && zip_available).then_some(Msg::ZipRequested)
}

pub(crate) fn logo_answer(file_id: FileId, choice: Option<LogoPreference>) -> Msg {
    match choice {
        Some(choice) => Msg::LogoChosen { file_id, choice },
        None => Msg::UploadFailed {
            file_id,
            message: "no logo chosen".to_string(),
        },
    }
}

fn upload_request(path: std::path::PathBuf, params: &UploadParams) -> UploadRequest {
    UploadRequest {
        path,
        watermark_type: params.watermark_style,
        image_quality: params.quality.as_str().to_string(),
        burn_after_read: params.burn_after_read,
        logo_preference: params.logo_preference.map(|logo| logo.as_str().to_string()),
        lang: params.lang.code().to_string(),
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadFinished { file_id, result } => match result {
            Ok(UploadOutcome::Accepted { job_id }) => Msg::UploadAccepted { file_id, job_id },
            Ok(UploadOutcome::NeedsLogoChoice) => Msg::UploadNeedsLogoChoice { file_id },
            Err(err) => {
                wm_warn!("Upload {} failed: {}", file_id, err);
                Msg::UploadFailed {
                    file_id,
                    message: err.user_message(),
                }
            }
        },
        EngineEvent::StatusFetched { file_id, result } => match result {
            Ok(status) => Msg::StatusReported {
                file_id,
                report: map_status(status),
            },
            Err(err) => {
                wm_warn!("Poll {} failed: {}", file_id, err);
                Msg::PollFailed {
                    file_id,
                    expired: err.kind == FailureKind::UnknownJob,
                    message: err.user_message(),
                }
            }
        },
        EngineEvent::ResultDownloaded { file_id, result } => match result {
            Ok(path) => Msg::ResultSaved { file_id, path },
            Err(err) => {
                wm_warn!("Download {} failed: {}", file_id, err);
                Msg::ResultSaveFailed {
                    file_id,
                    message: err.user_message(),
                }
            }
        },
        EngineEvent::ZipDownloaded { result } => match result {
            Ok(path) => Msg::ZipSaved { path },
            Err(err) => {
                wm_warn!("Zip failed: {}", err);
                Msg::ZipFailed {
                    message: err.user_message(),
                }
            }
        },
    }
}

fn map_status(status: JobStatus) -> StatusReport {
    StatusReport {
        status: map_state(status.state),
        progress_percent: status.progress_percent,
        stage: status.stage,
        result_url: status.result_url,
        result_name: status.result_name,
        error: status.error,
    }
}

fn map_state(state: JobState) -> TaskStatus {
    match state {
        JobState::Queued => TaskStatus::Queued,
        JobState::Processing => TaskStatus::Processing,
        JobState::Succeeded => TaskStatus::Succeeded,
        JobState::Failed => TaskStatus::Failed,
    }
}
