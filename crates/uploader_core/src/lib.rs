//! Uploader core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod stage;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use stage::{classify_stage, DisplayCategory};
pub use state::{
    AcceptedFile, AppState, JobId, LogEntry, StageReport, SELECT_DIRECTORY_ALERT,
    UPLOAD_COMPLETE_TEXT,
};
pub use update::update;
pub use view_model::{AppViewModel, LogEntryView, ProgressView, ValidationView};
