use uploader_core::{update, AcceptedFile, AppState, Effect, Msg, ValidationView};

fn choose(state: AppState, name: &str) -> (AppState, u64) {
    let (state, effects) = update(
        state,
        Msg::FileChosen {
            name: name.to_string(),
        },
    );
    match effects.as_slice() {
        [Effect::ValidateFile { job_id }] => (state, *job_id),
        other => panic!("unexpected effects: {other:?}"),
    }
}

fn accepted(name: &str) -> AcceptedFile {
    AcceptedFile {
        name: name.to_string(),
        size_bytes: 2048,
        content_type: "image/png".to_string(),
    }
}

#[test]
fn choosing_a_file_shows_validating() {
    let (state, _job_id) = choose(AppState::new(), "photo.png");

    assert!(state.validation_pending());
    assert_eq!(
        state.view().validation,
        ValidationView::Validating {
            name: "photo.png".to_string()
        }
    );
}

#[test]
fn accepted_file_is_shown() {
    let (state, job_id) = choose(AppState::new(), "photo.png");
    let (state, effects) = update(
        state,
        Msg::ValidationFinished {
            job_id,
            result: Ok(accepted("photo.png")),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.validation_pending());
    assert_eq!(
        state.view().validation,
        ValidationView::Accepted(accepted("photo.png"))
    );
}

#[test]
fn rejection_clears_previously_accepted_file() {
    let (state, job_id) = choose(AppState::new(), "photo.png");
    let (state, _) = update(
        state,
        Msg::ValidationFinished {
            job_id,
            result: Ok(accepted("photo.png")),
        },
    );

    let (state, job_id) = choose(state, "report.txt");
    assert_eq!(
        state.view().validation,
        ValidationView::Validating {
            name: "report.txt".to_string()
        }
    );
    let (state, _) = update(
        state,
        Msg::ValidationFinished {
            job_id,
            result: Err("Invalid file type.".to_string()),
        },
    );

    assert_eq!(
        state.view().validation,
        ValidationView::Rejected {
            error: "Invalid file type.".to_string()
        }
    );
}

#[test]
fn new_selection_resets_previous_error() {
    let (state, job_id) = choose(AppState::new(), "report.txt");
    let (state, _) = update(
        state,
        Msg::ValidationFinished {
            job_id,
            result: Err("Invalid file type.".to_string()),
        },
    );

    let (state, _job_id) = choose(state, "photo.png");

    assert!(matches!(
        state.view().validation,
        ValidationView::Validating { .. }
    ));
}

#[test]
fn superseded_validation_result_is_dropped() {
    let (state, first) = choose(AppState::new(), "a.png");
    let (state, second) = choose(state, "b.png");
    assert_ne!(first, second);

    let (state, _) = update(
        state,
        Msg::ValidationFinished {
            job_id: first,
            result: Ok(accepted("a.png")),
        },
    );
    assert!(state.validation_pending());

    let (state, _) = update(
        state,
        Msg::ValidationFinished {
            job_id: second,
            result: Ok(accepted("b.png")),
        },
    );
    assert_eq!(
        state.view().validation,
        ValidationView::Accepted(accepted("b.png"))
    );
}
