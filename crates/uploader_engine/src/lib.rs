//! Uploader engine: IO pipeline and effect execution.
mod engine;
mod line_parser;
mod selection;
mod types;
mod upload;
mod validate;

pub use engine::{EngineError, EngineHandle};
pub use line_parser::{parse_stream, ChunkedLineParser, LineError, LineOutcome};
pub use selection::{
    guess_content_type, select_directory, select_file, SelectedFile, SelectionError,
};
pub use types::{
    EngineEvent, FailureKind, JobId, RenamedFolder, UploadError, UploadStageEvent, UploadSummary,
};
pub use upload::{ChannelProgressSink, ProgressSink, ReqwestUploader, UploadSettings, Uploader};
pub use validate::{
    allowed_extensions, extension_of, rule_for_extension, signature_matches, validate_file,
    FileTypeRule, ValidatedFile, ValidationFailure, ValidationSettings, FILE_TYPE_RULES,
};
