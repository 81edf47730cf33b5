use std::sync::Once;

use pretty_assertions::assert_eq;
use uploader_core::{
    update, AppState, DisplayCategory, Effect, Msg, ProgressView, StageReport,
    SELECT_DIRECTORY_ALERT, UPLOAD_COMPLETE_TEXT,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(uploader_logging::initialize_for_tests);
}

fn report(stage: &str, message: &str) -> StageReport {
    StageReport {
        stage: stage.to_string(),
        message: message.to_string(),
        ..StageReport::default()
    }
}

fn start(state: AppState, file_count: usize) -> (AppState, u64) {
    let (state, effects) = update(state, Msg::UploadSubmitted { file_count });
    let job_id = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartUpload { job_id } => Some(*job_id),
            _ => None,
        })
        .expect("start upload effect");
    (state, job_id)
}

#[test]
fn empty_selection_raises_alert_without_effects() {
    init_logging();
    let (mut next, effects) = update(AppState::new(), Msg::UploadSubmitted { file_count: 0 });

    assert!(effects.is_empty());
    let view = next.view();
    assert_eq!(view.alert.as_deref(), Some(SELECT_DIRECTORY_ALERT));
    assert!(!view.uploading);
    assert!(view.log.is_empty());
    assert!(next.consume_dirty());
}

#[test]
fn submit_starts_upload_and_marks_in_flight() {
    init_logging();
    let (next, effects) = update(AppState::new(), Msg::UploadSubmitted { file_count: 3 });

    assert_eq!(effects, vec![Effect::StartUpload { job_id: 1 }]);
    assert!(next.view().uploading);
    assert!(next.upload_in_flight());
}

#[test]
fn second_submit_while_in_flight_is_ignored() {
    init_logging();
    let (state, _job_id) = start(AppState::new(), 2);
    let (mut state, _) = update(state, Msg::Tick);
    assert!(state.consume_dirty());

    let (mut next, effects) = update(state, Msg::UploadSubmitted { file_count: 2 });

    assert!(effects.is_empty());
    assert!(next.upload_in_flight());
    assert!(!next.consume_dirty());
}

#[test]
fn stage_events_append_in_order_with_categories() {
    init_logging();
    let (state, job_id) = start(AppState::new(), 2);

    let (state, _) = update(
        state,
        Msg::StageReported {
            job_id,
            report: report("file_validation", "Validating request"),
        },
    );
    let (state, _) = update(
        state,
        Msg::StageReported {
            job_id,
            report: report("folder_structure", "Determining root folder"),
        },
    );
    let (state, _) = update(
        state,
        Msg::StageReported {
            job_id,
            report: report("mystery_stage", "Something new"),
        },
    );

    let view = state.view();
    let texts: Vec<_> = view.log.iter().map(|entry| entry.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "file_validation: Validating request",
            "folder_structure: Determining root folder",
            "mystery_stage: Something new",
        ]
    );
    let categories: Vec<_> = view.log.iter().map(|entry| entry.category).collect();
    assert_eq!(
        categories,
        vec![
            DisplayCategory::Validation,
            DisplayCategory::Neutral,
            DisplayCategory::Neutral,
        ]
    );
}

#[test]
fn document_creation_counts_render_progress() {
    init_logging();
    let (state, job_id) = start(AppState::new(), 5);

    let (state, _) = update(
        state,
        Msg::StageReported {
            job_id,
            report: StageReport {
                created_count: Some(3),
                valid_files_count: Some(5),
                ..report("document_creation", "Successfully created document: c.pdf")
            },
        },
    );

    let view = state.view();
    let entry = &view.log[0];
    assert_eq!(entry.category, DisplayCategory::Creation);
    assert_eq!(
        entry.progress,
        Some(ProgressView {
            created: 3,
            total: 5
        })
    );
    assert_eq!(entry.progress.and_then(|p| p.percent()), Some(60.0));
}

#[test]
fn progress_needs_both_counts() {
    init_logging();
    let (state, job_id) = start(AppState::new(), 5);

    let (state, _) = update(
        state,
        Msg::StageReported {
            job_id,
            report: StageReport {
                created_count: Some(3),
                ..report("document_creation", "Creating documents")
            },
        },
    );

    assert_eq!(state.view().log[0].progress, None);
}

#[test]
fn clean_finish_appends_upload_complete_and_clears_in_flight() {
    init_logging();
    let (state, job_id) = start(AppState::new(), 1);
    let (state, _) = update(
        state,
        Msg::StageReported {
            job_id,
            report: report("upload_complete", "Upload complete"),
        },
    );
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            job_id,
            result: Ok(()),
        },
    );

    let view = state.view();
    assert!(!view.uploading);
    assert_eq!(view.log.len(), 2);
    assert_eq!(view.log[1].text, UPLOAD_COMPLETE_TEXT);
    assert_eq!(view.log[1].category, DisplayCategory::Success);
}

#[test]
fn transport_failure_appends_single_error_entry() {
    init_logging();
    let (state, job_id) = start(AppState::new(), 1);
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            job_id,
            result: Err("connection reset".to_string()),
        },
    );

    let view = state.view();
    assert!(!view.uploading);
    assert_eq!(view.log.len(), 1);
    assert_eq!(view.log[0].text, "Error: connection reset");
    assert_eq!(view.log[0].category, DisplayCategory::Error);
}

#[test]
fn new_upload_clears_previous_log_and_alert() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::UploadSubmitted { file_count: 0 });
    let (state, job_id) = start(state, 1);
    assert_eq!(state.view().alert, None);

    let (state, _) = update(
        state,
        Msg::UploadFinished {
            job_id,
            result: Ok(()),
        },
    );
    assert_eq!(state.log().len(), 1);

    let (state, second_job) = start(state, 1);
    assert_ne!(second_job, job_id);
    assert!(state.log().is_empty());
}

#[test]
fn events_for_stale_jobs_are_ignored() {
    init_logging();
    let (state, first) = start(AppState::new(), 1);
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            job_id: first,
            result: Ok(()),
        },
    );
    let (state, _second) = start(state, 1);

    let (mut state, _) = update(
        state,
        Msg::StageReported {
            job_id: first,
            report: report("error", "late"),
        },
    );
    assert!(state.consume_dirty());
    let (mut state, _) = update(
        state,
        Msg::UploadFinished {
            job_id: first,
            result: Ok(()),
        },
    );

    assert!(state.log().is_empty());
    assert!(state.upload_in_flight());
    assert!(!state.consume_dirty());
}
