use std::time::Duration;

use uploader_core::{AcceptedFile, Effect, Msg, StageReport};
use uploader_engine::{
    EngineError, EngineEvent, EngineHandle, RenamedFolder, SelectedFile, UploadStageEvent, ValidatedFile,
};
use uploader_logging::{uploader_info, uploader_warn};

/// Turns core effects into engine commands and engine events back into `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
    directory: Vec<SelectedFile>,
    chosen: Option<SelectedFile>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            directory: Vec::new(),
            chosen: None,
        }
    }

    pub fn select_directory(&mut self, files: Vec<SelectedFile>) {
        self.directory = files;
    }

    pub fn choose_file(&mut self, file: SelectedFile) {
        self.chosen = Some(file);
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartUpload { job_id } => {
                    uploader_info!(
                        "StartUpload job_id={} files={}",
                        job_id,
                        self.directory.len()
                    );
                    self.engine.upload(job_id, self.directory.clone());
                }
                Effect::ValidateFile { job_id } => match &self.chosen {
                    Some(file) => {
                        uploader_info!("ValidateFile job_id={} name={}", job_id, file.name);
                        self.engine.validate(job_id, file.clone());
                    }
                    None => uploader_warn!("ValidateFile job_id={} without a chosen file", job_id),
                },
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Result<Option<Msg>, EngineError> {
        Ok(self.engine.recv_timeout(timeout)?.map(map_event))
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Stage { job_id, event } => Msg::StageReported {
            job_id,
            report: stage_report(&event),
        },
        // Already logged by the parser; malformed lines never reach the log view.
        EngineEvent::LineRejected { .. } => Msg::NoOp,
        EngineEvent::UploadCompleted { job_id, result } => Msg::UploadFinished {
            job_id,
            result: result.map(|_| ()).map_err(|err| err.to_string()),
        },
        EngineEvent::ValidationCompleted { job_id, result } => Msg::ValidationFinished {
            job_id,
            result: result.map(accepted_file).map_err(|err| err.to_string()),
        },
    }
}

fn accepted_file(file: ValidatedFile) -> AcceptedFile {
    AcceptedFile {
        name: file.name,
        size_bytes: file.size,
        content_type: file.content_type,
    }
}

pub fn stage_report(event: &UploadStageEvent) -> StageReport {
    let (created_count, valid_files_count) = match event {
        UploadStageEvent::DocumentCreation {
            created_count,
            valid_files_count,
            ..
        } => (*created_count, *valid_files_count),
        _ => (None, None),
    };
    StageReport {
        stage: event.stage().to_string(),
        message: event.message().to_string(),
        created_count,
        valid_files_count,
        details: detail_lines(event),
    }
}

fn detail_lines(event: &UploadStageEvent) -> Vec<String> {
    let mut lines = Vec::new();
    match event {
        UploadStageEvent::FileValidation { invalid_files, .. } => {
            push_list(&mut lines, "Invalid files", invalid_files.as_deref());
        }
        UploadStageEvent::DocumentCreation {
            failed_files,
            error,
            ..
        } => {
            push_list(&mut lines, "Failed files", failed_files.as_deref());
            push_error(&mut lines, error.as_deref());
        }
        UploadStageEvent::FolderStructure {
            renamed_folders, ..
        } => {
            lines.extend(renamed_folders.iter().flatten().map(renamed_line));
        }
        UploadStageEvent::UploadComplete {
            total_files,
            total_folders,
            ..
        } => {
            if let Some(files) = total_files {
                lines.push(format!("Total files: {files}"));
            }
            if let Some(folders) = total_folders {
                lines.push(format!("Total folders: {folders}"));
            }
        }
        UploadStageEvent::Error {
            invalid_files,
            error,
            ..
        } => {
            push_list(&mut lines, "Invalid files", invalid_files.as_deref());
            push_error(&mut lines, error.as_deref());
        }
        UploadStageEvent::FileFolderRelation { .. } | UploadStageEvent::Unknown { .. } => {}
    }
    lines
}

fn push_list(lines: &mut Vec<String>, label: &str, items: Option<&[String]>) {
    if let Some(items) = items.filter(|items| !items.is_empty()) {
        lines.push(format!("{label}: {}", items.join(", ")));
    }
}

fn push_error(lines: &mut Vec<String>, error: Option<&str>) {
    if let Some(error) = error {
        lines.push(format!("Error: {error}"));
    }
}

fn renamed_line(folder: &RenamedFolder) -> String {
    match &folder.parent_folder {
        Some(parent) => format!(
            "Renamed: {} -> {} (in {})",
            folder.original_path, folder.new_name, parent
        ),
        None => format!("Renamed: {} -> {}", folder.original_path, folder.new_name),
    }
}
