#![allow(dead_code)]

use std::path::PathBuf;

use watermark_core::{update, AppState, Effect, Msg, ProcessOptions, StatusReport, TaskStatus};

pub fn init_logging() {
    watermark_logging::initialize_for_tests();
}

pub fn options_with_style(style: u8) -> ProcessOptions {
    ProcessOptions {
        watermark_style: Some(style),
        ..ProcessOptions::default()
    }
}

pub fn select(state: AppState, names: &[&str]) -> (AppState, Vec<Effect>) {
    let paths = names.iter().map(|name| PathBuf::from("photos").join(name)).collect();
    update(state, Msg::FilesSelected(paths))
}

/// Selects `names`, picks style 1 and presses Process.
pub fn start_batch(state: AppState, names: &[&str]) -> (AppState, Vec<Effect>) {
    let (state, _) = select(state, names);
    let (state, _) = update(state, Msg::OptionsChanged(options_with_style(1)));
    update(state, Msg::ProcessClicked)
}

pub fn accept(state: AppState, file_id: u64, job_id: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::UploadAccepted {
            file_id,
            job_id: job_id.to_string(),
        },
    )
}

/// A `succeeded` report naming its result the way the engine does.
pub fn succeeded(url: &str) -> StatusReport {
    let path = url.split('?').next().unwrap_or(url);
    StatusReport {
        result_url: Some(url.to_string()),
        result_name: path.rsplit('/').next().map(str::to_string),
        ..StatusReport::with_status(TaskStatus::Succeeded)
    }
}
