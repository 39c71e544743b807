use std::collections::VecDeque;

use serde::Deserialize;

use crate::errors::StreamError;

/// Wire payload of one progress message. Both fields are optional; a message
/// may carry either, both, or neither.
#[derive(Debug, Deserialize)]
pub struct ProgressPayload {
    pub progress: Option<f64>,
    pub status: Option<String>,
}

/// Notification surfaced to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// Latest completion percentage, clamped to [0, 100].
    Percent(f64),
    /// Human-readable phase message derived from the `status` field.
    Phase(String),
}

/// Lifecycle of one progress subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Connecting,
    Streaming,
    Done,
    Failed,
}

/// Map a backend status key to the phrase shown to the user. Unknown keys
/// pass through so new backend phases still surface something.
pub fn phase_message(status: &str) -> String {
    match status {
        "processing" => "Finalizing download...".to_string(),
        "sending file" => "Sending file to browser...".to_string(),
        other => other.to_string(),
    }
}

/// Incremental server-sent-events framing: raw byte chunks in, complete
/// `data` payloads out. Chunk boundaries may fall anywhere, including inside
/// a UTF-8 sequence, so bytes are buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every event payload completed by it.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(event) = self.push_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    fn push_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            // Blank line dispatches the accumulated event.
            if self.data_lines.is_empty() {
                return None;
            }
            return Some(self.data_lines.drain(..).collect::<Vec<_>>().join("\n"));
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data_lines.push(value.to_string());
        }
        None
    }
}

/// Folds SSE payloads into `ProgressUpdate`s and tracks the stream state
/// machine `Connecting -> Streaming -> {Done, Failed}`. Transport-free so the
/// transitions can be exercised without a server.
#[derive(Debug)]
pub struct ProgressDecoder {
    sse: SseDecoder,
    state: StreamState,
    pending: VecDeque<ProgressUpdate>,
}

impl ProgressDecoder {
    pub fn new() -> Self {
        Self {
            sse: SseDecoder::new(),
            state: StreamState::Connecting,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, StreamState::Done | StreamState::Failed)
    }

    /// Mark the stream failed after a transport error.
    pub fn fail(&mut self) {
        self.state = StreamState::Failed;
    }

    /// Feed one transport chunk. A decoding failure fails the stream; chunks
    /// arriving after a terminal state are dropped.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        if self.is_terminal() {
            return Ok(());
        }
        self.state = StreamState::Streaming;

        for payload in self.sse.push_chunk(chunk) {
            if self.state == StreamState::Done {
                break;
            }
            let message: ProgressPayload = match serde_json::from_str(&payload) {
                Ok(message) => message,
                Err(err) => {
                    self.state = StreamState::Failed;
                    return Err(StreamError::MalformedPayload(err));
                }
            };

            if let Some(percent) = message.progress {
                self.pending
                    .push_back(ProgressUpdate::Percent(percent.clamp(0.0, 100.0)));
            }
            match message.status.as_deref() {
                Some("done") => self.state = StreamState::Done,
                Some(status) => self
                    .pending
                    .push_back(ProgressUpdate::Phase(phase_message(status))),
                None => {}
            }
        }
        Ok(())
    }

    pub fn poll_update(&mut self) -> Option<ProgressUpdate> {
        self.pending.pop_front()
    }
}

impl Default for ProgressDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_decoder_handles_split_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push_chunk(b"data: {\"prog").is_empty());
        assert!(decoder.push_chunk(b"ress\":42}\n").is_empty());
        let events = decoder.push_chunk(b"\n");
        assert_eq!(events, vec!["{\"progress\":42}".to_string()]);
    }

    #[test]
    fn sse_decoder_handles_crlf_comments_and_foreign_fields() {
        let mut decoder = SseDecoder::new();
        let events =
            decoder.push_chunk(b": ping\r\nevent: message\r\nid: 7\r\ndata: {\"x\":1}\r\n\r\n");
        assert_eq!(events, vec!["{\"x\":1}".to_string()]);
    }

    #[test]
    fn sse_decoder_joins_multi_line_data() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push_chunk(b"data: first\ndata: second\n\n");
        assert_eq!(events, vec!["first\nsecond".to_string()]);
    }

    #[test]
    fn progress_update_does_not_touch_phase() {
        let mut decoder = ProgressDecoder::new();
        decoder.push_chunk(b"data: {\"progress\":42}\n\n").unwrap();
        assert_eq!(decoder.poll_update(), Some(ProgressUpdate::Percent(42.0)));
        assert_eq!(decoder.poll_update(), None);
        assert_eq!(decoder.state(), StreamState::Streaming);
    }

    #[test]
    fn status_maps_to_phase_message() {
        let mut decoder = ProgressDecoder::new();
        decoder
            .push_chunk(b"data: {\"status\":\"processing\"}\n\ndata: {\"status\":\"sending file\"}\n\n")
            .unwrap();
        assert_eq!(
            decoder.poll_update(),
            Some(ProgressUpdate::Phase("Finalizing download...".into()))
        );
        assert_eq!(
            decoder.poll_update(),
            Some(ProgressUpdate::Phase("Sending file to browser...".into()))
        );
    }

    #[test]
    fn done_is_terminal_and_later_chunks_are_ignored() {
        let mut decoder = ProgressDecoder::new();
        decoder
            .push_chunk(b"data: {\"progress\":100,\"status\":\"done\"}\n\n")
            .unwrap();
        assert_eq!(decoder.poll_update(), Some(ProgressUpdate::Percent(100.0)));
        assert_eq!(decoder.state(), StreamState::Done);

        decoder.push_chunk(b"data: {\"progress\":5}\n\n").unwrap();
        assert_eq!(decoder.poll_update(), None);
        assert_eq!(decoder.state(), StreamState::Done);
    }

    #[test]
    fn malformed_payload_fails_the_stream() {
        let mut decoder = ProgressDecoder::new();
        let err = decoder.push_chunk(b"data: not json\n\n").unwrap_err();
        assert!(matches!(err, StreamError::MalformedPayload(_)));
        assert_eq!(decoder.state(), StreamState::Failed);
    }

    #[test]
    fn percent_is_clamped() {
        let mut decoder = ProgressDecoder::new();
        decoder
            .push_chunk(b"data: {\"progress\":180}\n\ndata: {\"progress\":-3}\n\n")
            .unwrap();
        assert_eq!(decoder.poll_update(), Some(ProgressUpdate::Percent(100.0)));
        assert_eq!(decoder.poll_update(), Some(ProgressUpdate::Percent(0.0)));
    }
}
