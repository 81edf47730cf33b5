use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use uploader_logging::{uploader_error, uploader_warn};

use crate::upload::{ChannelProgressSink, ReqwestUploader, UploadSettings, Uploader};
use crate::validate::{validate_file, ValidationFailure, ValidationSettings};
use crate::{EngineEvent, FailureKind, JobId, SelectedFile, UploadError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("engine stopped unexpectedly")]
    Disconnected,
}

enum EngineCommand {
    Upload {
        job_id: JobId,
        files: Vec<SelectedFile>,
    },
    Validate {
        job_id: JobId,
        file: SelectedFile,
    },
}

/// Runs uploads and validations on a background tokio runtime.
///
/// Dropping the handle stops the worker thread; work still in flight is abandoned.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(upload: UploadSettings, validation: ValidationSettings) -> Result<Self, EngineError> {
        Self::with_uploader(Arc::new(ReqwestUploader::new(upload)), validation)
    }

    pub fn with_uploader(
        uploader: Arc<dyn Uploader>,
        validation: ValidationSettings,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let uploader = uploader.clone();
                let guard_tx = event_tx.clone();
                let task_tx = event_tx.clone();
                let aborted = command.aborted();
                let task = runtime.spawn(async move {
                    handle_command(uploader.as_ref(), &validation, command, task_tx).await;
                });
                // A task that dies before sending its completion still gets one.
                runtime.spawn(async move {
                    if let Err(err) = task.await {
                        uploader_error!("Engine task ended abnormally: {}", err);
                        let _ = guard_tx.send(aborted);
                    }
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn upload(&self, job_id: JobId, files: Vec<SelectedFile>) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { job_id, files });
    }

    pub fn validate(&self, job_id: JobId, file: SelectedFile) {
        let _ = self.cmd_tx.send(EngineCommand::Validate { job_id, file });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// `Ok(None)` means nothing arrived in time; `Err` means the worker is gone
    /// and nothing more will arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Disconnected),
        }
    }
}

impl EngineCommand {
    /// The completion reported when this command's task never finishes.
    fn aborted(&self) -> EngineEvent {
        match self {
            EngineCommand::Upload { job_id, .. } => EngineEvent::UploadCompleted {
                job_id: *job_id,
                result: Err(UploadError::new(
                    FailureKind::Aborted,
                    "upload was interrupted",
                )),
            },
            EngineCommand::Validate { job_id, .. } => EngineEvent::ValidationCompleted {
                job_id: *job_id,
                result: Err(ValidationFailure::Interrupted),
            },
        }
    }
}

async fn handle_command(
    uploader: &dyn Uploader,
    validation: &ValidationSettings,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Upload { job_id, files } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = uploader.upload(job_id, &files, &sink).await;
            if let Err(err) = &result {
                uploader_warn!("Upload job {} failed ({}): {}", job_id, err.kind, err);
            }
            let _ = event_tx.send(EngineEvent::UploadCompleted { job_id, result });
        }
        EngineCommand::Validate { job_id, file } => {
            let result = validate_file(&file, validation).await;
            if let Err(err) = &result {
                uploader_warn!("Rejected {}: {}", file.name, err);
            }
            let _ = event_tx.send(EngineEvent::ValidationCompleted { job_id, result });
        }
    }
}
