use crate::stage::{classify_stage, DisplayCategory};
use crate::view_model::{AppViewModel, LogEntryView, ProgressView, ValidationView};

pub type JobId = u64;

/// Alert shown when the upload form is submitted without any files.
pub const SELECT_DIRECTORY_ALERT: &str = "Please select a directory.";
/// Synthetic entry appended once the response stream has ended cleanly.
pub const UPLOAD_COMPLETE_TEXT: &str = "Upload Complete!";

/// Display-oriented summary of one server stage event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageReport {
    pub stage: String,
    pub message: String,
    pub created_count: Option<u64>,
    pub valid_files_count: Option<u64>,
    /// Advisory lines (invalid files, renamed folders, error detail, ...).
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub category: DisplayCategory,
    pub text: String,
    pub details: Vec<String>,
    pub progress: Option<(u64, u64)>,
}

impl LogEntry {
    fn from_report(report: StageReport) -> Self {
        let progress = match (report.created_count, report.valid_files_count) {
            (Some(created), Some(total)) => Some((created, total)),
            _ => None,
        };
        Self {
            category: classify_stage(&report.stage),
            text: format!("{}: {}", report.stage, report.message),
            details: report.details,
            progress,
        }
    }

    fn synthetic(category: DisplayCategory, text: String) -> Self {
        Self {
            category,
            text,
            details: Vec::new(),
            progress: None,
        }
    }
}

/// A file that passed every validation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedFile {
    pub name: String,
    pub size_bytes: u64,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct UploadSession {
    active_job: Option<JobId>,
    log: Vec<LogEntry>,
    alert: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ValidationSession {
    active_job: Option<JobId>,
    file_name: Option<String>,
    accepted: Option<AcceptedFile>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    next_job_id: JobId,
    upload: UploadSession,
    validation: ValidationSession,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let validation = if self.validation.active_job.is_some() {
            ValidationView::Validating {
                name: self.validation.file_name.clone().unwrap_or_default(),
            }
        } else if let Some(error) = &self.validation.error {
            ValidationView::Rejected {
                error: error.clone(),
            }
        } else if let Some(file) = &self.validation.accepted {
            ValidationView::Accepted(file.clone())
        } else {
            ValidationView::Idle
        };

        AppViewModel {
            uploading: self.upload.active_job.is_some(),
            alert: self.upload.alert.clone(),
            log: self
                .upload
                .log
                .iter()
                .map(|entry| LogEntryView {
                    category: entry.category,
                    text: entry.text.clone(),
                    details: entry.details.clone(),
                    progress: entry
                        .progress
                        .map(|(created, total)| ProgressView { created, total }),
                })
                .collect(),
            validation,
        }
    }

    /// Returns whether the state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn upload_in_flight(&self) -> bool {
        self.upload.active_job.is_some()
    }

    pub fn validation_pending(&self) -> bool {
        self.validation.active_job.is_some()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.upload.log
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn allocate_job_id(&mut self) -> JobId {
        self.next_job_id += 1;
        self.next_job_id
    }

    pub(crate) fn raise_alert(&mut self, text: &str) {
        self.upload.alert = Some(text.to_string());
        self.mark_dirty();
    }

    /// Clears the previous log and marks a new upload as in flight.
    pub(crate) fn start_upload(&mut self) -> JobId {
        let job_id = self.allocate_job_id();
        self.upload = UploadSession {
            active_job: Some(job_id),
            log: Vec::new(),
            alert: None,
        };
        self.mark_dirty();
        job_id
    }

    pub(crate) fn is_active_upload(&self, job_id: JobId) -> bool {
        self.upload.active_job == Some(job_id)
    }

    pub(crate) fn append_report(&mut self, report: StageReport) {
        self.upload.log.push(LogEntry::from_report(report));
        self.mark_dirty();
    }

    pub(crate) fn finish_upload(&mut self, result: Result<(), String>) {
        let entry = match result {
            Ok(()) => LogEntry::synthetic(DisplayCategory::Success, UPLOAD_COMPLETE_TEXT.into()),
            Err(message) => LogEntry::synthetic(DisplayCategory::Error, format!("Error: {message}")),
        };
        self.upload.log.push(entry);
        self.upload.active_job = None;
        self.mark_dirty();
    }

    /// Drops any previous validation outcome and tracks the new file.
    pub(crate) fn start_validation(&mut self, name: String) -> JobId {
        let job_id = self.allocate_job_id();
        self.validation = ValidationSession {
            active_job: Some(job_id),
            file_name: Some(name),
            accepted: None,
            error: None,
        };
        self.mark_dirty();
        job_id
    }

    pub(crate) fn is_active_validation(&self, job_id: JobId) -> bool {
        self.validation.active_job == Some(job_id)
    }

    pub(crate) fn finish_validation(&mut self, result: Result<AcceptedFile, String>) {
        self.validation.active_job = None;
        match result {
            Ok(file) => {
                self.validation.accepted = Some(file);
                self.validation.error = None;
            }
            Err(error) => {
                self.validation.accepted = None;
                self.validation.error = Some(error);
            }
        }
        self.mark_dirty();
    }
}
