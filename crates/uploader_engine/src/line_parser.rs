use encoding_rs::{CoderResult, Decoder, UTF_8};
use futures_util::{Stream, StreamExt};
use uploader_logging::{uploader_trace, uploader_warn};

use crate::UploadStageEvent;

/// Result of parsing one complete, non-blank line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Event(UploadStageEvent),
    Rejected(LineError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line_number}: {message}")]
pub struct LineError {
    /// 1-based position of the line in the stream, blank lines included.
    pub line_number: usize,
    pub line: String,
    pub message: String,
}

/// Incremental newline-delimited JSON parser.
///
/// Bytes are decoded with a stateful UTF-8 decoder, so a multi-byte
/// character split across two chunks still decodes as one character. Text
/// after the last newline stays buffered until more bytes arrive or the
/// stream ends.
pub struct ChunkedLineParser {
    decoder: Decoder,
    buffer: String,
    lines_seen: usize,
}

impl Default for ChunkedLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedLineParser {
    pub fn new() -> Self {
        Self {
            decoder: UTF_8.new_decoder_with_bom_removal(),
            buffer: String::new(),
            lines_seen: 0,
        }
    }

    /// Text received after the last newline, not yet emitted.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Feed one chunk; returns the outcomes of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<LineOutcome> {
        self.decode(chunk, false);
        self.drain_complete_lines()
    }

    /// Signal end of input. A non-empty remainder is treated as a final line.
    pub fn finish(mut self) -> Vec<LineOutcome> {
        self.decode(&[], true);
        let mut outcomes = self.drain_complete_lines();
        if !self.buffer.is_empty() {
            let last = std::mem::take(&mut self.buffer);
            outcomes.extend(self.parse_line(&last));
        }
        outcomes
    }

    fn decode(&mut self, mut bytes: &[u8], last: bool) {
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(bytes.len())
                .unwrap_or(bytes.len().saturating_mul(3) + 4);
            self.buffer.reserve(needed);
            let (result, read, _had_errors) =
                self.decoder.decode_to_string(bytes, &mut self.buffer, last);
            bytes = &bytes[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }

    fn drain_complete_lines(&mut self) -> Vec<LineOutcome> {
        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        let mut outcomes = Vec::new();
        // `complete` ends with '\n', so the final split piece is empty and skipped.
        let mut pieces: Vec<&str> = complete.split('\n').collect();
        pieces.pop();
        for piece in pieces {
            outcomes.extend(self.parse_line(piece));
        }
        outcomes
    }

    fn parse_line(&mut self, raw: &str) -> Option<LineOutcome> {
        self.lines_seen += 1;
        let line = raw.trim();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_str::<UploadStageEvent>(line) {
            Ok(event) => {
                uploader_trace!("line {} -> stage {}", self.lines_seen, event.stage());
                Some(LineOutcome::Event(event))
            }
            Err(err) => {
                uploader_warn!(
                    "Dropping malformed progress line {}: {} ({:?})",
                    self.lines_seen,
                    err,
                    line
                );
                Some(LineOutcome::Rejected(LineError {
                    line_number: self.lines_seen,
                    line: line.to_string(),
                    message: err.to_string(),
                }))
            }
        }
    }
}

/// Drive a fresh parser over a chunk stream, handing each outcome to
/// `on_outcome` as soon as its line is complete.
///
/// Stops at the first stream error; text still buffered at that point is
/// discarded.
pub async fn parse_stream<S, B, E, F>(stream: S, mut on_outcome: F) -> Result<u64, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    F: FnMut(LineOutcome),
{
    let mut parser = ChunkedLineParser::new();
    let mut bytes_received = 0u64;
    let mut stream = std::pin::pin!(stream);

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        bytes_received += chunk.len() as u64;
        for outcome in parser.push(chunk) {
            on_outcome(outcome);
        }
    }
    for outcome in parser.finish() {
        on_outcome(outcome);
    }
    Ok(bytes_received)
}
