mod common;

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use watermark_core::{
    update, AppState, Effect, FilePhase, Lang, LogoPreference, Msg, Notice, ProcessOptions,
    Quality, SessionState, UploadParams,
};

use common::{init_logging, options_with_style, select, start_batch};

#[test]
fn selection_rejects_unsupported_extensions() {
    init_logging();
    let (mut state, effects) = select(AppState::new(), &["a.jpg", "notes.txt", "B.PNG"]);
    assert!(effects.is_empty());

    let view = state.view();
    assert_eq!(view.selected_count, 2);
    assert_eq!(view.rejected, vec!["notes.txt".to_string()]);
    assert_eq!(
        view.notice,
        Some(Notice::RejectedFiles(vec!["notes.txt".to_string()]))
    );
    assert!(view
        .rows
        .iter()
        .all(|row| row.phase == FilePhase::Selected));
    assert!(state.consume_dirty());
}

#[test]
fn process_without_style_raises_notice_and_sends_nothing() {
    init_logging();
    let (state, _) = select(AppState::new(), &["a.jpg"]);
    let (state, effects) = update(state, Msg::ProcessClicked);

    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Idle);
    assert_eq!(state.view().notice, Some(Notice::SelectWatermark));
}

#[test]
fn style_zero_counts_as_unselected() {
    let (state, _) = select(AppState::new(), &["a.jpg"]);
    let (state, _) = update(state, Msg::OptionsChanged(options_with_style(0)));
    let (state, effects) = update(state, Msg::ProcessClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().notice, Some(Notice::SelectWatermark));
}

#[test]
fn process_without_files_raises_notice() {
    let (state, _) = update(AppState::new(), Msg::OptionsChanged(options_with_style(2)));
    let (state, effects) = update(state, Msg::ProcessClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().notice, Some(Notice::NothingSelected));
}

#[test]
fn process_emits_one_upload_per_file_with_options() {
    init_logging();
    let (state, _) = select(AppState::new(), &["a.jpg", "b.png"]);
    let options = ProcessOptions {
        watermark_style: Some(3),
        quality: Quality::Medium,
        burn_after_read: true,
        logo_preference: None,
        lang: Lang::En,
    };
    let (state, _) = update(state, Msg::OptionsChanged(options));
    let (state, effects) = update(state, Msg::ProcessClicked);

    let params = UploadParams {
        watermark_style: 3,
        quality: Quality::Medium,
        burn_after_read: true,
        logo_preference: None,
        lang: Lang::En,
    };
    assert_eq!(
        effects,
        vec![
            Effect::Upload {
                file_id: 1,
                path: PathBuf::from("photos").join("a.jpg"),
                params: params.clone(),
            },
            Effect::Upload {
                file_id: 2,
                path: PathBuf::from("photos").join("b.png"),
                params,
            },
        ]
    );
    assert_eq!(state.session(), SessionState::Running);
    assert_eq!(state.batch().total_count, 2);
    assert_eq!(state.batch().completed_count, 0);
}

#[test]
fn selection_and_options_are_frozen_while_running() {
    let (state, _) = start_batch(AppState::new(), &["a.jpg"]);
    let before = state.clone();

    let (state, effects) = select(state, &["other.jpg"]);
    assert!(effects.is_empty());
    assert_eq!(state, before);

    let (state, effects) = update(state, Msg::OptionsChanged(options_with_style(4)));
    assert!(effects.is_empty());
    assert_eq!(state.options().watermark_style, Some(1));

    let (_state, effects) = update(state, Msg::ProcessClicked);
    assert!(effects.is_empty());
}

#[test]
fn logo_choice_uses_configured_preference() {
    let (state, _) = select(AppState::new(), &["mi.jpg"]);
    let options = ProcessOptions {
        logo_preference: Some(LogoPreference::Leica),
        ..options_with_style(1)
    };
    let (state, _) = update(state, Msg::OptionsChanged(options));
    let (state, _) = update(state, Msg::ProcessClicked);
    let (state, effects) = update(state, Msg::UploadNeedsLogoChoice { file_id: 1 });

    match effects.as_slice() {
        [Effect::Upload { file_id, params, .. }] => {
            assert_eq!(*file_id, 1);
            assert_eq!(params.logo_preference, Some(LogoPreference::Leica));
        }
        other => panic!("unexpected effects: {other:?}"),
    }

    // Asking again after a logo was sent fails the file instead of looping.
    let (state, effects) = update(state, Msg::UploadNeedsLogoChoice { file_id: 1 });
    assert_eq!(
        effects,
        vec![Effect::BatchFinished {
            succeeded: 0,
            failed: 1,
            zip_available: false,
        }]
    );
    assert_eq!(state.session(), SessionState::Finished);
}

#[test]
fn logo_choice_prompts_when_no_preference() {
    let (state, _) = start_batch(AppState::new(), &["mi.jpg"]);
    let (state, effects) = update(state, Msg::UploadNeedsLogoChoice { file_id: 1 });
    assert_eq!(
        effects,
        vec![Effect::AskLogoChoice {
            file_id: 1,
            source_name: "mi.jpg".to_string(),
        }]
    );
    assert_eq!(state.view().rows[0].phase, FilePhase::AwaitingLogoChoice);

    let (state, effects) = update(
        state,
        Msg::LogoChosen {
            file_id: 1,
            choice: LogoPreference::Xiaomi,
        },
    );
    match effects.as_slice() {
        [Effect::Upload { params, .. }] => {
            assert_eq!(params.logo_preference, Some(LogoPreference::Xiaomi));
        }
        other => panic!("unexpected effects: {other:?}"),
    }
    assert_eq!(state.view().rows[0].phase, FilePhase::Uploading);
}

#[test]
fn reselecting_after_finish_starts_fresh() {
    let (state, _) = start_batch(AppState::new(), &["a.jpg"]);
    let (state, _) = update(
        state,
        Msg::UploadFailed {
            file_id: 1,
            message: "Invalid file type".to_string(),
        },
    );
    assert_eq!(state.session(), SessionState::Finished);

    let (state, _) = select(state, &["c.jpeg"]);
    let view = state.view();
    assert_eq!(view.session, SessionState::Idle);
    assert_eq!(view.batch.total, 0);
    assert_eq!(view.rows.len(), 1);
    // Ids keep increasing across selections.
    assert_eq!(view.rows[0].file_id, 2);
}
