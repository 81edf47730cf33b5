use std::time::Duration;

use bytes::Bytes;
use futures_util::{stream, TryStreamExt};
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use uploader_logging::{uploader_debug, uploader_info, uploader_warn};
use url::Url;

use crate::line_parser::{parse_stream, LineOutcome};
use crate::{EngineEvent, FailureKind, JobId, SelectedFile, UploadError, UploadSummary};

const API_TOKEN_HEADER: &str = "X-API-Token";

/// Where and as whom an upload is sent.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub base_url: String,
    pub collection_id: String,
    pub bearer_token: String,
    pub api_token: String,
    pub connect_timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            collection_id: String::new(),
            bearer_token: String::new(),
            api_token: String::new(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl UploadSettings {
    /// `{base_url}/api/ai-assistant/collection-details/{collection_id}/async-folder-upload/`
    pub fn endpoint(&self) -> Result<Url, UploadError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| UploadError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| {
                UploadError::new(
                    FailureKind::InvalidUrl,
                    format!("base url cannot carry a path: {}", self.base_url),
                )
            })?
            .pop_if_empty()
            .extend([
                "api",
                "ai-assistant",
                "collection-details",
                self.collection_id.as_str(),
                "async-folder-upload",
                "",
            ]);
        Ok(url)
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    /// Send `files` in one multipart request and report every parsed stage
    /// event to `sink` while the response streams in.
    async fn upload(
        &self,
        job_id: JobId,
        files: &[SelectedFile],
        sink: &dyn ProgressSink,
    ) -> Result<UploadSummary, UploadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    settings: UploadSettings,
}

impl ReqwestUploader {
    pub fn new(settings: UploadSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, UploadError> {
        // No overall timeout: the response stays open for the whole server pipeline.
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| UploadError::new(FailureKind::Network, err.to_string()))
    }
}

/// One `files` part per file, each followed by its `paths` part.
///
/// Files are only checked here. Each one is opened when its part is first
/// polled and closed again at end of file, so a request carrying thousands
/// of files holds at most one descriptor at a time.
async fn build_form(files: &[SelectedFile]) -> Result<Form, UploadError> {
    let mut form = Form::new();
    for file in files {
        let metadata = tokio::fs::metadata(&file.path)
            .await
            .map_err(|err| file_error(file, err))?;
        if !metadata.is_file() {
            return Err(UploadError::new(
                FailureKind::FileRead,
                format!("not a regular file: {}", file.path.display()),
            ));
        }

        let path = file.path.clone();
        let contents = stream::once(async move { tokio::fs::File::open(path).await })
            .map_ok(ReaderStream::new)
            .try_flatten();
        let body = reqwest::Body::wrap_stream(contents);
        let mut part = Part::stream_with_length(body, file.size).file_name(file.name.clone());
        if let Some(content_type) = file.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|err| UploadError::new(FailureKind::InvalidRequest, err.to_string()))?;
        }
        form = form
            .part("files", part)
            .text("paths", file.relative_path.clone());
    }
    Ok(form)
}

fn file_error(file: &SelectedFile, err: std::io::Error) -> UploadError {
    UploadError::new(
        FailureKind::FileRead,
        format!("failed to read {}: {}", file.path.display(), err),
    )
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(
        &self,
        job_id: JobId,
        files: &[SelectedFile],
        sink: &dyn ProgressSink,
    ) -> Result<UploadSummary, UploadError> {
        if files.is_empty() {
            return Err(UploadError::new(
                FailureKind::EmptySelection,
                "no files selected",
            ));
        }

        let endpoint = self.settings.endpoint()?;
        let client = self.build_client()?;
        let form = build_form(files).await?;

        uploader_info!(
            "Uploading {} files for job {} to {}",
            files.len(),
            job_id,
            endpoint
        );

        let response = client
            .post(endpoint)
            .bearer_auth(&self.settings.bearer_token)
            .header(API_TOKEN_HEADER, &self.settings.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        // The body is parsed for every status.
        let status = response.status();
        if !status.is_success() {
            uploader_warn!("Job {} answered with status {}", job_id, status);
        }

        let mut summary = UploadSummary::default();
        let chunks = response
            .bytes_stream()
            .map_err(map_reqwest_error)
            .map_ok(|chunk: Bytes| {
                uploader_debug!("job {} received {} bytes", job_id, chunk.len());
                chunk
            });
        let bytes_received = parse_stream(chunks, |outcome| match outcome {
            LineOutcome::Event(event) => {
                summary.events += 1;
                sink.emit(EngineEvent::Stage { job_id, event });
            }
            LineOutcome::Rejected(error) => {
                summary.rejected_lines += 1;
                sink.emit(EngineEvent::LineRejected { job_id, error });
            }
        })
        .await?;
        summary.bytes_received = bytes_received;

        uploader_info!(
            "Job {} stream ended: {} events, {} rejected lines, {} bytes",
            job_id,
            summary.events,
            summary.rejected_lines,
            summary.bytes_received
        );
        Ok(summary)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        return UploadError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return UploadError::new(FailureKind::InvalidRequest, err.to_string());
    }
    UploadError::new(FailureKind::Network, err.to_string())
}
