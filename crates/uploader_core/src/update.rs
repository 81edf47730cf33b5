use crate::{AppState, Effect, Msg, SELECT_DIRECTORY_ALERT};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UploadSubmitted { file_count } => {
            // The submit control is disabled while a request runs; a late
            // click that still gets through is dropped here.
            if state.upload_in_flight() {
                return (state, Vec::new());
            }
            if file_count == 0 {
                state.raise_alert(SELECT_DIRECTORY_ALERT);
                return (state, Vec::new());
            }
            let job_id = state.start_upload();
            vec![Effect::StartUpload { job_id }]
        }
        Msg::StageReported { job_id, report } => {
            if state.is_active_upload(job_id) {
                state.append_report(report);
            }
            Vec::new()
        }
        Msg::UploadFinished { job_id, result } => {
            if state.is_active_upload(job_id) {
                state.finish_upload(result);
            }
            Vec::new()
        }
        Msg::FileChosen { name } => {
            let job_id = state.start_validation(name);
            vec![Effect::ValidateFile { job_id }]
        }
        Msg::ValidationFinished { job_id, result } => {
            // A newer selection supersedes results still in flight.
            if state.is_active_validation(job_id) {
                state.finish_validation(result);
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
