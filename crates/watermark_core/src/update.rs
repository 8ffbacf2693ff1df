use crate::{
    AppState, DownloadState, Effect, FailureReason, FileId, FilePhase, Msg, Notice,
    SessionState, StatusReport, TaskStatus, ZipState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let session_before = state.session();
    let mut effects = match msg {
        Msg::FilesSelected(paths) => {
            // A running batch keeps its selection until every job is terminal.
            if state.session() == SessionState::Running {
                return (state, Vec::new());
            }
            state.select_files(paths);
            Vec::new()
        }
        Msg::OptionsChanged(options) => {
            if state.session() == SessionState::Running {
                return (state, Vec::new());
            }
            state.set_options(options);
            Vec::new()
        }
        Msg::ProcessClicked => start_batch(&mut state),
        Msg::UploadAccepted { file_id, job_id } => {
            if !is_uploading(&state, file_id) {
                return (state, Vec::new());
            }
            state.create_task(file_id, job_id.clone());
            vec![Effect::PollStatus {
                file_id,
                job_id,
                delay: state.policy().initial_delay,
            }]
        }
        Msg::UploadNeedsLogoChoice { file_id } => logo_choice_needed(&mut state, file_id),
        Msg::LogoChosen { file_id, choice } => {
            let awaiting = state
                .entry(file_id)
                .is_some_and(|entry| entry.phase == FilePhase::AwaitingLogoChoice);
            if !awaiting {
                return (state, Vec::new());
            }
            match state.resend_with_logo(file_id, choice) {
                Some((path, params)) => vec![Effect::Upload {
                    file_id,
                    path,
                    params,
                }],
                None => Vec::new(),
            }
        }
        Msg::UploadFailed { file_id, message } => {
            let pending = state.entry(file_id).is_some_and(|entry| {
                matches!(
                    entry.phase,
                    FilePhase::Uploading | FilePhase::AwaitingLogoChoice
                )
            });
            if pending {
                state.set_phase(file_id, FilePhase::Failed(FailureReason::Rejected(message)));
                state.complete_one();
            }
            Vec::new()
        }
        Msg::StatusReported { file_id, report } => apply_report(&mut state, file_id, report),
        Msg::PollFailed {
            file_id,
            message,
            expired,
        } => poll_failed(&mut state, file_id, message, expired),
        Msg::ResultSaved { file_id, path } => {
            set_download(&mut state, file_id, DownloadState::Saved(path));
            Vec::new()
        }
        Msg::ResultSaveFailed { file_id, message } => {
            set_download(&mut state, file_id, DownloadState::Failed(message));
            Vec::new()
        }
        Msg::ZipRequested => {
            let can_request = matches!(state.zip(), ZipState::Available | ZipState::Failed(_));
            if !can_request {
                return (state, Vec::new());
            }
            let filenames = state.batch().succeeded_filenames.clone();
            state.set_zip(ZipState::Requested);
            vec![Effect::RequestZip { filenames }]
        }
        Msg::ZipSaved { path } => {
            if *state.zip() == ZipState::Requested {
                state.set_zip(ZipState::Saved(path));
            }
            Vec::new()
        }
        Msg::ZipFailed { message } => {
            if *state.zip() == ZipState::Requested {
                state.set_zip(ZipState::Failed(message));
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    if session_before == SessionState::Running && state.session() == SessionState::Finished {
        let view = state.view();
        effects.push(Effect::BatchFinished {
            succeeded: view.batch.succeeded,
            failed: view.batch.failed,
            zip_available: state.batch().zip_available(),
        });
    }

    (state, effects)
}

fn start_batch(state: &mut AppState) -> Vec<Effect> {
    if state.session() == SessionState::Running {
        return Vec::new();
    }
    let Some(style) = state.options().selected_style() else {
        state.set_notice(Notice::SelectWatermark);
        return Vec::new();
    };
    if !state.has_files() {
        state.set_notice(Notice::NothingSelected);
        return Vec::new();
    }
    state
        .start_batch(style)
        .into_iter()
        .map(|(file_id, path, params)| Effect::Upload {
            file_id,
            path,
            params,
        })
        .collect()
}

fn is_uploading(state: &AppState, file_id: FileId) -> bool {
    state
        .entry(file_id)
        .is_some_and(|entry| entry.phase == FilePhase::Uploading)
}

fn logo_choice_needed(state: &mut AppState, file_id: FileId) -> Vec<Effect> {
    if !is_uploading(state, file_id) {
        return Vec::new();
    }
    let already_sent = state
        .entry(file_id)
        .and_then(|entry| entry.logo_override)
        .is_some();
    if already_sent {
        state.set_phase(file_id, FilePhase::Failed(FailureReason::LogoRejected));
        state.complete_one();
        return Vec::new();
    }

    if let Some(logo) = state.options().logo_preference {
        return match state.resend_with_logo(file_id, logo) {
            Some((path, params)) => vec![Effect::Upload {
                file_id,
                path,
                params,
            }],
            None => Vec::new(),
        };
    }

    let Some(entry) = state.entry_mut(file_id) else {
        return Vec::new();
    };
    entry.phase = FilePhase::AwaitingLogoChoice;
    let source_name = entry.file.display_name.clone();
    state.mark_dirty();
    vec![Effect::AskLogoChoice {
        file_id,
        source_name,
    }]
}

fn apply_report(state: &mut AppState, file_id: FileId, report: StatusReport) -> Vec<Effect> {
    let max_polls = state.policy().max_polls;
    let interval = state.policy().interval;
    let Some(task) = state.task_mut(file_id) else {
        return Vec::new();
    };
    if task.status.is_terminal() {
        return Vec::new();
    }

    task.polls += 1;
    task.poll_errors = 0;
    if let Some(percent) = report.progress_percent {
        task.progress = task.progress.max(percent.min(100));
    }
    if report.stage.is_some() {
        task.stage = report.stage;
    }

    match report.status {
        TaskStatus::Queued | TaskStatus::Processing => {
            task.status = report.status;
            let job_id = task.job_id.clone();
            let over_budget = task.polls >= max_polls;
            let phase = if report.status == TaskStatus::Queued {
                FilePhase::Queued
            } else {
                FilePhase::Processing
            };
            if over_budget {
                state.fail_task(file_id, FailureReason::PollTimeout);
                return Vec::new();
            }
            state.set_phase(file_id, phase);
            vec![Effect::PollStatus {
                file_id,
                job_id,
                delay: interval,
            }]
        }
        TaskStatus::Succeeded => match report.result_url {
            Some(url) => {
                match state.succeed_task(file_id, url.clone(), report.result_name) {
                    Some(file_name) => vec![Effect::DownloadResult {
                        file_id,
                        url,
                        file_name,
                    }],
                    None => Vec::new(),
                }
            }
            None => {
                state.fail_task(file_id, FailureReason::MissingResult);
                Vec::new()
            }
        },
        TaskStatus::Failed => {
            state.fail_task(file_id, FailureReason::Server(report.error));
            Vec::new()
        }
    }
}

fn poll_failed(state: &mut AppState, file_id: FileId, message: String, expired: bool) -> Vec<Effect> {
    let policy = state.policy().clone();
    let Some(task) = state.task_mut(file_id) else {
        return Vec::new();
    };
    if task.status.is_terminal() {
        return Vec::new();
    }
    if expired {
        state.fail_task(file_id, FailureReason::Expired);
        return Vec::new();
    }

    task.polls += 1;
    task.poll_errors += 1;
    if task.poll_errors >= policy.max_consecutive_errors {
        state.fail_task(file_id, FailureReason::Unreachable(message));
        return Vec::new();
    }
    if task.polls >= policy.max_polls {
        state.fail_task(file_id, FailureReason::PollTimeout);
        return Vec::new();
    }
    let job_id = task.job_id.clone();
    state.mark_dirty();
    vec![Effect::PollStatus {
        file_id,
        job_id,
        delay: policy.interval,
    }]
}

fn set_download(state: &mut AppState, file_id: FileId, download: DownloadState) {
    if let Some(task) = state.task_mut(file_id) {
        if task.download == DownloadState::InFlight {
            task.download = download;
            state.mark_dirty();
        }
    }
}
