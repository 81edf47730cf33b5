use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::line_parser::LineError;
use crate::validate::{ValidatedFile, ValidationFailure};

pub type JobId = u64;

/// A folder the server renamed to avoid a clash with an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenamedFolder {
    pub original_path: String,
    pub new_name: String,
    #[serde(default)]
    pub parent_folder: Option<String>,
}

/// One line of the upload progress stream, keyed by its `stage` field.
///
/// Only `stage` and `message` are required on the wire. The remaining fields
/// are advisory: a field that is missing or has an unexpected type is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireEvent")]
pub enum UploadStageEvent {
    FileValidation {
        message: String,
        invalid_files: Option<Vec<String>>,
    },
    DocumentCreation {
        message: String,
        created_count: Option<u64>,
        valid_files_count: Option<u64>,
        failed_files: Option<Vec<String>>,
        error: Option<String>,
    },
    FolderStructure {
        message: String,
        renamed_folders: Option<Vec<RenamedFolder>>,
    },
    FileFolderRelation {
        message: String,
    },
    UploadComplete {
        message: String,
        total_files: Option<u64>,
        total_folders: Option<u64>,
    },
    Error {
        message: String,
        invalid_files: Option<Vec<String>>,
        error: Option<String>,
    },
    /// A stage this client does not know yet.
    Unknown { stage: String, message: String },
}

impl UploadStageEvent {
    pub fn stage(&self) -> &str {
        match self {
            Self::FileValidation { .. } => "file_validation",
            Self::DocumentCreation { .. } => "document_creation",
            Self::FolderStructure { .. } => "folder_structure",
            Self::FileFolderRelation { .. } => "file_folder_relation",
            Self::UploadComplete { .. } => "upload_complete",
            Self::Error { .. } => "error",
            Self::Unknown { stage, .. } => stage,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::FileValidation { message, .. }
            | Self::DocumentCreation { message, .. }
            | Self::FolderStructure { message, .. }
            | Self::FileFolderRelation { message }
            | Self::UploadComplete { message, .. }
            | Self::Error { message, .. }
            | Self::Unknown { message, .. } => message,
        }
    }

    /// `(created_count, valid_files_count)` when a document creation event carries both.
    pub fn creation_progress(&self) -> Option<(u64, u64)> {
        match self {
            Self::DocumentCreation {
                created_count: Some(created),
                valid_files_count: Some(total),
                ..
            } => Some((*created, *total)),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct WireEvent {
    stage: String,
    message: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<WireEvent> for UploadStageEvent {
    fn from(wire: WireEvent) -> Self {
        let WireEvent {
            stage,
            message,
            mut extra,
        } = wire;

        match stage.as_str() {
            "file_validation" => Self::FileValidation {
                message,
                invalid_files: take_strings(&mut extra, "invalid_files"),
            },
            "document_creation" => Self::DocumentCreation {
                message,
                created_count: take_u64(&mut extra, "created_count"),
                valid_files_count: take_u64(&mut extra, "valid_files_count"),
                failed_files: take_strings(&mut extra, "failed_files"),
                error: take_string(&mut extra, "error"),
            },
            "folder_structure" => Self::FolderStructure {
                message,
                renamed_folders: extra
                    .remove("renamed_folders")
                    .and_then(|value| serde_json::from_value(value).ok()),
            },
            "file_folder_relation" => Self::FileFolderRelation { message },
            "upload_complete" => Self::UploadComplete {
                message,
                total_files: take_u64(&mut extra, "total_files"),
                total_folders: take_u64(&mut extra, "total_folders"),
            },
            "error" => Self::Error {
                message,
                invalid_files: take_strings(&mut extra, "invalid_files"),
                error: take_string(&mut extra, "error"),
            },
            _ => Self::Unknown { stage, message },
        }
    }
}

fn take_u64(extra: &mut Map<String, Value>, key: &str) -> Option<u64> {
    extra.remove(key).and_then(|value| value.as_u64())
}

fn take_string(extra: &mut Map<String, Value>, key: &str) -> Option<String> {
    match extra.remove(key)? {
        Value::String(text) => Some(text),
        _ => None,
    }
}

fn take_strings(extra: &mut Map<String, Value>, key: &str) -> Option<Vec<String>> {
    serde_json::from_value(extra.remove(key)?).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadSummary {
    pub events: usize,
    pub rejected_lines: usize,
    pub bytes_received: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Stage {
        job_id: JobId,
        event: UploadStageEvent,
    },
    LineRejected {
        job_id: JobId,
        error: LineError,
    },
    UploadCompleted {
        job_id: JobId,
        result: Result<UploadSummary, UploadError>,
    },
    ValidationCompleted {
        job_id: JobId,
        result: Result<ValidatedFile, ValidationFailure>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UploadError {
    pub kind: FailureKind,
    pub message: String,
}

impl UploadError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    EmptySelection,
    InvalidUrl,
    InvalidRequest,
    FileRead,
    Timeout,
    Network,
    /// The upload task stopped without reporting a result.
    Aborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::EmptySelection => write!(f, "empty selection"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::FileRead => write!(f, "file read error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Aborted => write!(f, "aborted"),
        }
    }
}
