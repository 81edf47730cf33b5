#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the current directory selection to the upload endpoint.
    StartUpload { job_id: crate::JobId },
    /// Run the signature validator against the chosen file.
    ValidateFile { job_id: crate::JobId },
}
