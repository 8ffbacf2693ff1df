use watermark_core::{
    substitute, texts, AppViewModel, DownloadState, FailureReason, FilePhase, FileRowView,
    Notice, SessionState, Texts, ZipState,
};

/// Lines describing what changed between two views.
///
/// The terminal is append-only, so only transitions are printed: a file's
/// phase, a 10% step of its progress, its download, the zip and the batch.
pub fn render(previous: Option<&AppViewModel>, view: &AppViewModel) -> Vec<String> {
    let t = texts(view.lang);
    let mut lines = Vec::new();

    if previous.map(|p| &p.notice) != Some(&view.notice) {
        if let Some(notice) = &view.notice {
            lines.push(notice_text(t, notice));
        }
    }

    let selection_changed = previous.map_or(true, |p| p.selected_count != view.selected_count);
    if selection_changed && view.session == SessionState::Idle && view.selected_count > 0 {
        lines.push(substitute(t.selected, view.selected_count));
    }

    for row in &view.rows {
        let before = previous.and_then(|p| p.rows.iter().find(|r| r.file_id == row.file_id));
        lines.extend(row_lines(t, before, row));
    }

    let finished_now = view.session == SessionState::Finished
        && previous.map_or(true, |p| p.session != SessionState::Finished);
    if finished_now {
        lines.push(substitute(
            t.batch_summary,
            format!(
                "{} {} / {} {}",
                view.batch.succeeded, t.status_success, view.batch.failed, t.status_failed
            ),
        ));
    }

    if previous.map(|p| &p.zip) != Some(&view.zip) {
        match &view.zip {
            ZipState::Unavailable => {}
            ZipState::Available => lines.push(t.zip_available.to_string()),
            ZipState::Requested => lines.push(t.zip_packing.to_string()),
            ZipState::Saved(path) => lines.push(substitute(t.zip_saved, path.display())),
            ZipState::Failed(message) => lines.push(substitute(t.zip_failed, message)),
        }
    }

    lines
}

fn row_lines(t: &Texts, before: Option<&FileRowView>, row: &FileRowView) -> Vec<String> {
    let mut lines = Vec::new();
    let phase_changed = before.map_or(true, |b| b.phase != row.phase);
    let progress_step = before.is_some_and(|b| row.progress / 10 > b.progress / 10);

    if phase_changed || (progress_step && row.phase == FilePhase::Processing) {
        let status = match &row.phase {
            FilePhase::Selected => t.status_selected.to_string(),
            FilePhase::Uploading => t.status_uploading.to_string(),
            FilePhase::AwaitingLogoChoice => t.logo_waiting.to_string(),
            FilePhase::Queued => t.status_queued.to_string(),
            FilePhase::Processing => match &row.stage {
                Some(stage) => format!("{} {}% ({stage})", t.status_processing, row.progress),
                None => format!("{} {}%", t.status_processing, row.progress),
            },
            FilePhase::Succeeded => t.status_success.to_string(),
            FilePhase::Failed(reason) => {
                format!("{}: {}", t.status_failed, failure_text(t, reason))
            }
        };
        // Selected rows are summarised by the selection line.
        if row.phase != FilePhase::Selected {
            lines.push(format!("[{}] {status}", row.name));
        }
    }

    if before.map_or(true, |b| b.download != row.download) {
        match &row.download {
            DownloadState::Saved(path) => lines.push(format!(
                "[{}] {}",
                row.name,
                substitute(t.saved_to, path.display())
            )),
            DownloadState::Failed(message) => lines.push(format!(
                "[{}] {}",
                row.name,
                substitute(t.save_failed, message)
            )),
            DownloadState::NotStarted | DownloadState::InFlight => {}
        }
    }
    lines
}

fn notice_text(t: &Texts, notice: &Notice) -> String {
    match notice {
        Notice::SelectWatermark => t.select_watermark.to_string(),
        Notice::NothingSelected => t.nothing_selected.to_string(),
        Notice::RejectedFiles(names) => substitute(t.rejected, names.join(", ")),
    }
}

pub fn failure_text(t: &Texts, reason: &FailureReason) -> String {
    match reason {
        FailureReason::Rejected(message) => message.clone(),
        FailureReason::LogoRejected => t.error_logo_rejected.to_string(),
        FailureReason::Server(Some(message)) => message.clone(),
        FailureReason::Server(None) => t.error_unexpected.to_string(),
        FailureReason::MissingResult => t.error_missing_result.to_string(),
        FailureReason::Expired => t.error_expired.to_string(),
        FailureReason::Unreachable(message) => substitute(t.error_unreachable, message),
        FailureReason::PollTimeout => t.error_timeout.to_string(),
    }
}
