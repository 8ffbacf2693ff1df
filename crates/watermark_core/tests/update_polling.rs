mod common;

use std::path::PathBuf;
use std::time::Duration;

use pretty_assertions::assert_eq;
use watermark_core::{
    update, AppState, DownloadState, Effect, FailureReason, FilePhase, Msg, PollPolicy,
    SessionState, StatusReport, TaskStatus,
};

use common::{accept, init_logging, start_batch, succeeded};

fn report(status: TaskStatus, progress: Option<u8>) -> StatusReport {
    StatusReport {
        progress_percent: progress,
        ..StatusReport::with_status(status)
    }
}

#[test]
fn accepted_upload_creates_queued_task_and_schedules_poll() {
    init_logging();
    let (state, _) = start_batch(AppState::new(), &["a.jpg"]);
    let (state, effects) = accept(state, 1, "job-a");

    assert_eq!(
        effects,
        vec![Effect::PollStatus {
            file_id: 1,
            job_id: "job-a".to_string(),
            delay: PollPolicy::default().initial_delay,
        }]
    );
    let task = state.task(1).expect("task created");
    assert_eq!(task.status, TaskStatus::Queued);
    assert_eq!(task.job_id, "job-a");
    assert_eq!(task.source_name, "a.jpg");
}

#[test]
fn accepted_upload_for_unknown_file_is_ignored() {
    let (state, _) = start_batch(AppState::new(), &["a.jpg"]);
    let (state, effects) = accept(state, 42, "job-x");
    assert!(effects.is_empty());
    assert!(state.task(42).is_none());
}

#[test]
fn rejected_upload_counts_toward_batch_completion() {
    let (state, _) = start_batch(AppState::new(), &["a.jpg", "b.jpg"]);
    let (state, effects) = update(
        state,
        Msg::UploadFailed {
            file_id: 1,
            message: "Unsupported camera!".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.batch().completed_count, 1);
    assert_eq!(
        state.view().rows[0].phase,
        FilePhase::Failed(FailureReason::Rejected("Unsupported camera!".to_string()))
    );
    assert_eq!(state.session(), SessionState::Running);

    let (state, _) = accept(state, 2, "job-b");
    let (state, effects) = update(
        state,
        Msg::StatusReported {
            file_id: 2,
            report: succeeded("/upload/b_watermark.jpg"),
        },
    );
    assert!(effects.contains(&Effect::BatchFinished {
        succeeded: 1,
        failed: 1,
        zip_available: true,
    }));
    assert_eq!(state.batch().completed_count, 2);
}

#[test]
fn progress_is_monotone_and_polling_continues_until_terminal() {
    init_logging();
    let (state, _) = start_batch(AppState::new(), &["a.jpg"]);
    let (state, _) = accept(state, 1, "job-a");

    let (state, effects) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: StatusReport {
                stage: Some("processing".to_string()),
                ..report(TaskStatus::Processing, Some(40))
            },
        },
    );
    assert_eq!(
        effects,
        vec![Effect::PollStatus {
            file_id: 1,
            job_id: "job-a".to_string(),
            delay: Duration::from_secs(1),
        }]
    );
    assert_eq!(state.view().rows[0].phase, FilePhase::Processing);
    assert_eq!(state.view().rows[0].stage.as_deref(), Some("processing"));

    let (state, _) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: report(TaskStatus::Processing, Some(10)),
        },
    );
    assert_eq!(state.task(1).unwrap().progress, 40);
    assert_eq!(state.session(), SessionState::Running);
}

#[test]
fn success_downloads_result_and_finishes_batch() {
    init_logging();
    let (state, _) = start_batch(AppState::new(), &["DSC_1.jpg"]);
    let (state, _) = accept(state, 1, "job-a");
    let url = "/upload/DSC_1_2024-01-01_10-00-00_watermark.jpg?lang=zh&burn=0";
    let (mut state, effects) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: succeeded(url),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::DownloadResult {
                file_id: 1,
                url: url.to_string(),
                file_name: "DSC_1_watermark.jpg".to_string(),
            },
            Effect::BatchFinished {
                succeeded: 1,
                failed: 0,
                zip_available: true,
            },
        ]
    );
    assert_eq!(
        state.batch().succeeded_filenames,
        vec!["DSC_1_2024-01-01_10-00-00_watermark.jpg".to_string()]
    );
    assert_eq!(state.task(1).unwrap().progress, 100);
    assert_eq!(state.session(), SessionState::Finished);
    assert!(!state.is_settled(), "download still in flight");
    assert!(state.consume_dirty());

    let saved = PathBuf::from("out/DSC_1_watermark.jpg");
    let (state, _) = update(
        state,
        Msg::ResultSaved {
            file_id: 1,
            path: saved.clone(),
        },
    );
    assert_eq!(state.task(1).unwrap().download, DownloadState::Saved(saved));
    assert!(state.is_settled());
}

#[test]
fn same_basename_results_get_distinct_local_names() {
    let (state, _) = start_batch(AppState::new(), &["x/IMG.jpg", "y/IMG.jpg"]);
    let (state, _) = accept(state, 1, "job-x");
    let (state, _) = accept(state, 2, "job-y");

    let (state, first) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: succeeded("/upload/IMG_1_watermark.jpg"),
        },
    );
    let (state, second) = update(
        state,
        Msg::StatusReported {
            file_id: 2,
            report: succeeded("/upload/IMG_2_watermark.jpg"),
        },
    );

    let names: Vec<String> = first
        .iter()
        .chain(second.iter())
        .filter_map(|effect| match effect {
            Effect::DownloadResult { file_name, .. } => Some(file_name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        names,
        vec!["IMG_watermark.jpg".to_string(), "IMG_watermark_2.jpg".to_string()]
    );
    assert_eq!(
        state.task(2).unwrap().local_name.as_deref(),
        Some("IMG_watermark_2.jpg")
    );
}

#[test]
fn success_without_result_url_fails_task() {
    let (state, _) = start_batch(AppState::new(), &["a.jpg"]);
    let (state, _) = accept(state, 1, "job-a");
    let (state, effects) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: report(TaskStatus::Succeeded, None),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::BatchFinished {
            succeeded: 0,
            failed: 1,
            zip_available: false,
        }]
    );
    assert_eq!(
        state.task(1).unwrap().failure,
        Some(FailureReason::MissingResult)
    );
}

#[test]
fn server_failure_keeps_message() {
    let (state, _) = start_batch(AppState::new(), &["a.jpg", "b.jpg"]);
    let (state, _) = accept(state, 1, "job-a");
    let (state, effects) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: StatusReport {
                error: Some("Unsupported camera!".to_string()),
                ..StatusReport::with_status(TaskStatus::Failed)
            },
        },
    );

    // Second file is still uploading, so the batch stays open.
    assert!(effects.is_empty());
    assert_eq!(state.batch().completed_count, 1);
    assert_eq!(
        state.view().rows[0].phase,
        FilePhase::Failed(FailureReason::Server(Some("Unsupported camera!".to_string())))
    );
}

#[test]
fn reports_after_terminal_state_are_ignored() {
    let (state, _) = start_batch(AppState::new(), &["a.jpg", "b.jpg"]);
    let (state, _) = accept(state, 1, "job-a");
    let (state, _) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: StatusReport::with_status(TaskStatus::Failed),
        },
    );
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: succeeded("/upload/late.jpg"),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn expired_job_fails_immediately() {
    let (state, _) = start_batch(AppState::new(), &["a.jpg"]);
    let (state, _) = accept(state, 1, "job-a");
    let (state, _) = update(
        state,
        Msg::PollFailed {
            file_id: 1,
            message: "unknown".to_string(),
            expired: true,
        },
    );
    assert_eq!(state.task(1).unwrap().failure, Some(FailureReason::Expired));
    assert_eq!(state.session(), SessionState::Finished);
}

#[test]
fn transient_poll_errors_retry_until_limit() {
    init_logging();
    let policy = PollPolicy {
        max_consecutive_errors: 3,
        ..PollPolicy::default()
    };
    let (state, _) = start_batch(AppState::with_policy(policy), &["a.jpg"]);
    let (mut state, _) = accept(state, 1, "job-a");

    for _ in 0..2 {
        let (next, effects) = update(
            state,
            Msg::PollFailed {
                file_id: 1,
                message: "connection refused".to_string(),
                expired: false,
            },
        );
        assert!(matches!(effects.as_slice(), [Effect::PollStatus { .. }]));
        state = next;
    }

    // A good answer resets the error streak.
    let (state, _) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: report(TaskStatus::Queued, None),
        },
    );
    let mut state = state;
    for _ in 0..2 {
        let (next, _) = update(
            state,
            Msg::PollFailed {
                file_id: 1,
                message: "connection refused".to_string(),
                expired: false,
            },
        );
        state = next;
    }
    assert_eq!(state.task(1).unwrap().status, TaskStatus::Queued);

    let (state, _) = update(
        state,
        Msg::PollFailed {
            file_id: 1,
            message: "connection refused".to_string(),
            expired: false,
        },
    );
    assert_eq!(
        state.task(1).unwrap().failure,
        Some(FailureReason::Unreachable("connection refused".to_string()))
    );
}

#[test]
fn poll_budget_exhaustion_times_out() {
    let policy = PollPolicy {
        max_polls: 2,
        ..PollPolicy::default()
    };
    let (state, _) = start_batch(AppState::with_policy(policy), &["a.jpg"]);
    let (state, _) = accept(state, 1, "job-a");
    let (state, effects) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: report(TaskStatus::Queued, None),
        },
    );
    assert_eq!(effects.len(), 1);
    let (state, effects) = update(
        state,
        Msg::StatusReported {
            file_id: 1,
            report: report(TaskStatus::Processing, Some(90)),
        },
    );
    assert!(matches!(
        effects.as_slice(),
        [Effect::BatchFinished { failed: 1, .. }]
    ));
    assert_eq!(state.task(1).unwrap().failure, Some(FailureReason::PollTimeout));
}
