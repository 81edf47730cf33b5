#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the upload form with the given number of selected files.
    UploadSubmitted { file_count: usize },
    /// One event parsed from the upload response stream.
    StageReported {
        job_id: crate::JobId,
        report: crate::StageReport,
    },
    /// The upload response stream ended, cleanly or with a transport error.
    UploadFinished {
        job_id: crate::JobId,
        result: Result<(), String>,
    },
    /// User chose a single file for validation.
    FileChosen { name: String },
    /// The validator finished with the chosen file.
    ValidationFinished {
        job_id: crate::JobId,
        result: Result<crate::AcceptedFile, String>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
