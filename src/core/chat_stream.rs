use async_trait::async_trait;
use futures_util::StreamExt;
use memchr::memchr;
use reqwest::Method;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{RunMetadata, RunRequest, StreamedMessage, TurnMessage};
use crate::core::backend::{ensure_success, Backend};
use crate::core::errors::StreamError;

#[derive(Clone, Debug, PartialEq)]
pub enum StreamMessage {
    Metadata(RunMetadata),
    /// Full snapshot of the thread's messages for this run so far.
    Messages(Vec<StreamedMessage>),
    Error(String),
    End,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Idle,
    Running {
        thread_id: String,
    },
    Done {
        thread_id: String,
    },
    Failed {
        thread_id: String,
        message: String,
    },
}

impl StreamStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, StreamStatus::Running { .. })
    }

    pub fn thread_id(&self) -> Option<&str> {
        match self {
            StreamStatus::Idle => None,
            StreamStatus::Running { thread_id }
            | StreamStatus::Done { thread_id }
            | StreamStatus::Failed { thread_id, .. } => Some(thread_id),
        }
    }
}

#[async_trait]
/// Executes turns against a thread and tracks the single active stream.
pub trait StreamEngine: Send {
    /// Begin a run. `messages == None` resumes the thread without new input.
    async fn start(
        &mut self,
        messages: Option<Vec<TurnMessage>>,
        assistant_id: &str,
        thread_id: &str,
    ) -> Result<(), StreamError>;

    /// Request cancellation of the active stream without waiting for it to
    /// wind down. `force` also discards what the stream produced so far.
    /// Safe to call while idle.
    fn stop(&mut self, force: bool);

    fn status(&self) -> &StreamStatus;
}

const EVENT_METADATA: &str = "metadata";
const EVENT_DATA: &str = "data";
const EVENT_ERROR: &str = "error";
const EVENT_END: &str = "end";

/// Accumulates the fields of one SSE event until the blank line that ends it.
#[derive(Default)]
struct SseCursor {
    event: Option<String>,
    data: Vec<String>,
}

impl SseCursor {
    /// Returns true once the stream has reached a terminal event.
    fn process_line(
        &mut self,
        line: &str,
        tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
        stream_id: u64,
    ) -> bool {
        if line.is_empty() {
            return self.dispatch(tx, stream_id);
        }
        if line.starts_with(':') {
            return false;
        }
        if let Some(name) = line.strip_prefix("event:") {
            self.event = Some(name.trim().to_string());
        } else if let Some(payload) = line.strip_prefix("data:") {
            let payload = payload.strip_prefix(' ').unwrap_or(payload);
            self.data.push(payload.to_string());
        }
        false
    }

    /// Emit the pending event, if any. Multi-line data is joined with `\n`.
    fn dispatch(
        &mut self,
        tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
        stream_id: u64,
    ) -> bool {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);
        if event.is_none() && data.is_empty() {
            return false;
        }
        let event = event.as_deref().unwrap_or(EVENT_DATA);
        handle_event(event, &data.join("\n"), tx, stream_id)
    }
}

fn handle_event(
    event: &str,
    payload: &str,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> bool {
    match event {
        EVENT_METADATA => {
            match serde_json::from_str::<RunMetadata>(payload) {
                Ok(metadata) => {
                    let _ = tx.send((StreamMessage::Metadata(metadata), stream_id));
                }
                Err(err) => debug!(%err, "ignoring malformed run metadata"),
            }
            false
        }
        EVENT_DATA => {
            match serde_json::from_str::<Vec<StreamedMessage>>(payload) {
                Ok(messages) => {
                    let _ = tx.send((StreamMessage::Messages(messages), stream_id));
                }
                Err(err) => debug!(%err, "ignoring undecodable data event"),
            }
            false
        }
        EVENT_ERROR => {
            let _ = tx.send((StreamMessage::Error(format_api_error(payload)), stream_id));
            let _ = tx.send((StreamMessage::End, stream_id));
            true
        }
        EVENT_END => {
            let _ = tx.send((StreamMessage::End, stream_id));
            true
        }
        other => {
            debug!(event = other, "ignoring unknown stream event");
            false
        }
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = match value {
        serde_json::Value::String(s) => Some(s.clone()),
        _ => value
            .get("message")
            .or_else(|| value.get("detail"))
            .and_then(|v| v.as_str().map(str::to_owned)),
    };

    summary.map(|text| {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim().to_string()
    })
}

fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "Run failed".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return format!("Run failed: {summary}");
            }
        }
    }

    format!("Run failed: {trimmed}")
}

async fn pump_events(
    response: reqwest::Response,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) {
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut cursor = SseCursor::default();

    while let Some(chunk) = stream.next().await {
        let chunk_bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                let message = format_api_error(&err.to_string());
                let _ = tx.send((StreamMessage::Error(message), stream_id));
                let _ = tx.send((StreamMessage::End, stream_id));
                return;
            }
        };
        buffer.extend_from_slice(&chunk_bytes);

        while let Some(newline_pos) = memchr(b'\n', &buffer) {
            let should_end = match std::str::from_utf8(&buffer[..newline_pos]) {
                Ok(line) => cursor.process_line(line.trim_end_matches('\r'), tx, stream_id),
                Err(err) => {
                    debug!(%err, "skipping invalid UTF-8 line in run stream");
                    false
                }
            };
            buffer.drain(..=newline_pos);
            if should_end {
                return;
            }
        }
    }

    if !cursor.dispatch(tx, stream_id) {
        let _ = tx.send((StreamMessage::End, stream_id));
    }
}

/// [`StreamEngine`] that runs turns through the backend's `runs/stream`
/// endpoint. Events are delivered on the receiver returned by [`Self::new`]
/// and must be fed back through [`Self::apply`] to advance the status.
pub struct HttpStreamEngine {
    backend: Backend,
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
    cancel_token: Option<CancellationToken>,
    current_stream_id: u64,
    status: StreamStatus,
    run_id: Option<String>,
    messages: Vec<StreamedMessage>,
}

impl HttpStreamEngine {
    pub fn new(backend: Backend) -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Self {
            backend,
            tx,
            cancel_token: None,
            current_stream_id: 0,
            status: StreamStatus::Idle,
            run_id: None,
            messages: Vec::new(),
        };
        (engine, rx)
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.current_stream_id == stream_id
    }

    pub fn current_stream_id(&self) -> u64 {
        self.current_stream_id
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    pub fn messages(&self) -> &[StreamedMessage] {
        &self.messages
    }

    /// Fold one event into the engine state. Returns false for events from a
    /// stream that has since been stopped or replaced.
    pub fn apply(&mut self, message: StreamMessage, stream_id: u64) -> bool {
        if !self.is_current_stream(stream_id) {
            debug!(stream_id, current = self.current_stream_id, "dropping stale stream event");
            return false;
        }

        match message {
            StreamMessage::Metadata(metadata) => {
                self.run_id = Some(metadata.run_id);
            }
            StreamMessage::Messages(messages) => {
                self.messages = messages;
            }
            StreamMessage::Error(message) => {
                self.cancel_token = None;
                if let Some(thread_id) = self.status.thread_id().map(str::to_owned) {
                    self.status = StreamStatus::Failed { thread_id, message };
                }
            }
            StreamMessage::End => {
                self.cancel_token = None;
                if let StreamStatus::Running { thread_id } = &self.status {
                    self.status = StreamStatus::Done {
                        thread_id: thread_id.clone(),
                    };
                }
            }
        }
        true
    }

    fn cancel_current_stream(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        // Anything still queued from the cancelled task is now stale.
        self.current_stream_id += 1;
    }
}

#[async_trait]
impl StreamEngine for HttpStreamEngine {
    async fn start(
        &mut self,
        messages: Option<Vec<TurnMessage>>,
        assistant_id: &str,
        thread_id: &str,
    ) -> Result<(), StreamError> {
        self.cancel_current_stream();
        let stream_id = self.current_stream_id;

        let request = RunRequest {
            assistant_id,
            thread_id,
            input: messages.as_deref(),
        };

        let sent = self
            .backend
            .request(Method::POST, "runs/stream")
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&request)
            .send()
            .await;

        let response = match sent {
            Ok(response) => ensure_success(response)
                .await
                .map_err(|(status, body)| StreamError::Status { status, body }),
            Err(err) => Err(StreamError::from(err)),
        };
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                self.status = StreamStatus::Failed {
                    thread_id: thread_id.to_string(),
                    message: err.to_string(),
                };
                return Err(err);
            }
        };

        let token = CancellationToken::new();
        self.cancel_token = Some(token.clone());
        self.status = StreamStatus::Running {
            thread_id: thread_id.to_string(),
        };
        self.run_id = None;
        self.messages = messages
            .unwrap_or_default()
            .into_iter()
            .map(|message| StreamedMessage {
                id: None,
                content: serde_json::Value::String(message.content),
                kind: message.kind,
                additional_kwargs: message.additional_kwargs,
            })
            .collect();
        debug!(stream_id, thread_id, assistant_id, "run stream opened");

        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = pump_events(response, &tx, stream_id) => {}
                _ = token.cancelled() => {}
            }
        });

        Ok(())
    }

    fn stop(&mut self, force: bool) {
        let was_running = self.cancel_token.is_some();
        self.cancel_current_stream();

        if force {
            self.status = StreamStatus::Idle;
            self.messages.clear();
            self.run_id = None;
        } else if let StreamStatus::Running { thread_id } = &self.status {
            self.status = StreamStatus::Done {
                thread_id: thread_id.clone(),
            };
        }
        if was_running {
            debug!(force, "run stream stopped");
        }
    }

    fn status(&self) -> &StreamStatus {
        &self.status
    }
}
