use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::api::TurnMessage;
use crate::core::app::Workspace;
use crate::core::assistant::{AssistantConfig, ConfigStore};
use crate::core::backend::Backend;
use crate::core::chat::{Chat, ChatStore};
use crate::core::chat_stream::{StreamEngine, StreamStatus};
use crate::core::errors::{StoreError, StreamError};
use crate::core::shared_selection::SelectionState;

/// Every collaborator call made by a fake, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateChat {
        message: String,
        assistant_id: String,
    },
    SelectChat(Option<String>),
    SelectConfig(Option<String>),
    SaveConfig(String),
    Start {
        messages: Option<Vec<TurnMessage>>,
        assistant_id: String,
        thread_id: String,
    },
    Stop {
        force: bool,
    },
}

pub type Journal = Arc<std::sync::Mutex<Vec<Call>>>;

pub fn new_journal() -> Journal {
    Arc::new(std::sync::Mutex::new(Vec::new()))
}

pub fn calls(journal: &Journal) -> Vec<Call> {
    journal.lock().unwrap().clone()
}

pub fn clear_calls(journal: &Journal) {
    journal.lock().unwrap().clear();
}

pub fn chat(thread_id: &str, assistant_id: &str) -> Chat {
    Chat {
        thread_id: thread_id.to_string(),
        assistant_id: assistant_id.to_string(),
        name: format!("chat {thread_id}"),
        updated_at: None,
    }
}

pub fn assistant(assistant_id: &str, name: &str) -> AssistantConfig {
    AssistantConfig {
        assistant_id: assistant_id.to_string(),
        name: name.to_string(),
        config: serde_json::json!({ "configurable": { "type": "chatbot" } }),
        public: false,
        updated_at: None,
    }
}

pub struct FakeChatStore {
    state: SelectionState<Chat>,
    journal: Journal,
    next_thread: u32,
    pub fail_create: bool,
}

impl FakeChatStore {
    pub fn new(chats: Option<Vec<Chat>>, journal: Journal) -> Self {
        let mut state = SelectionState::new("Thread");
        if let Some(chats) = chats {
            state.replace_items(chats);
        }
        Self {
            state,
            journal,
            next_thread: 0,
            fail_create: false,
        }
    }
}

#[async_trait]
impl ChatStore for FakeChatStore {
    fn list(&self) -> Option<&[Chat]> {
        self.state.items()
    }

    fn current(&self) -> Option<&Chat> {
        self.state.get_active()
    }

    async fn create(&mut self, message: &str, assistant_id: &str) -> Result<Chat, StoreError> {
        self.journal.lock().unwrap().push(Call::CreateChat {
            message: message.to_string(),
            assistant_id: assistant_id.to_string(),
        });
        if self.fail_create {
            return Err(StoreError::Status {
                status: 500,
                body: "create failed".into(),
            });
        }
        self.next_thread += 1;
        let created = Chat {
            thread_id: format!("new-{}", self.next_thread),
            assistant_id: assistant_id.to_string(),
            name: message.to_string(),
            updated_at: None,
        };
        self.state.upsert(created.clone());
        self.state.set_active(Some(&created.thread_id));
        Ok(created)
    }

    fn select(&mut self, thread_id: Option<&str>) {
        self.journal
            .lock()
            .unwrap()
            .push(Call::SelectChat(thread_id.map(str::to_owned)));
        self.state.set_active(thread_id);
    }
}

pub struct FakeConfigStore {
    state: SelectionState<AssistantConfig>,
    journal: Journal,
}

impl FakeConfigStore {
    pub fn new(configs: Option<Vec<AssistantConfig>>, journal: Journal) -> Self {
        let mut state = SelectionState::new("Assistant");
        if let Some(configs) = configs {
            state.replace_items(configs);
        }
        Self { state, journal }
    }

    pub fn set_items(&mut self, configs: Vec<AssistantConfig>) {
        self.state.replace_items(configs);
    }
}

#[async_trait]
impl ConfigStore for FakeConfigStore {
    fn list(&self) -> Option<&[AssistantConfig]> {
        self.state.items()
    }

    fn current(&self) -> Option<&AssistantConfig> {
        self.state.get_active()
    }

    fn select(&mut self, assistant_id: Option<&str>) {
        self.journal
            .lock()
            .unwrap()
            .push(Call::SelectConfig(assistant_id.map(str::to_owned)));
        self.state.set_active(assistant_id);
    }

    async fn save(&mut self, mut config: AssistantConfig) -> Result<AssistantConfig, StoreError> {
        if config.is_draft() {
            config.assistant_id = format!("saved-{}", config.name);
        }
        self.journal
            .lock()
            .unwrap()
            .push(Call::SaveConfig(config.assistant_id.clone()));
        self.state.upsert(config.clone());
        self.state.set_active(Some(&config.assistant_id));
        Ok(config)
    }
}

pub struct FakeStreamEngine {
    status: StreamStatus,
    journal: Journal,
    pub fail_start: bool,
}

impl FakeStreamEngine {
    pub fn new(journal: Journal) -> Self {
        Self {
            status: StreamStatus::Idle,
            journal,
            fail_start: false,
        }
    }

    pub fn set_status(&mut self, status: StreamStatus) {
        self.status = status;
    }
}

#[async_trait]
impl StreamEngine for FakeStreamEngine {
    async fn start(
        &mut self,
        messages: Option<Vec<TurnMessage>>,
        assistant_id: &str,
        thread_id: &str,
    ) -> Result<(), StreamError> {
        self.journal.lock().unwrap().push(Call::Start {
            messages,
            assistant_id: assistant_id.to_string(),
            thread_id: thread_id.to_string(),
        });
        if self.fail_start {
            return Err(StreamError::Status {
                status: 404,
                body: "Assistant not found".into(),
            });
        }
        self.status = StreamStatus::Running {
            thread_id: thread_id.to_string(),
        };
        Ok(())
    }

    fn stop(&mut self, force: bool) {
        self.journal.lock().unwrap().push(Call::Stop { force });
        if force {
            self.status = StreamStatus::Idle;
        } else if let StreamStatus::Running { thread_id } = &self.status {
            self.status = StreamStatus::Done {
                thread_id: thread_id.clone(),
            };
        }
    }

    fn status(&self) -> &StreamStatus {
        &self.status
    }
}

pub type TestWorkspace = Workspace<FakeChatStore, FakeConfigStore, FakeStreamEngine>;

/// Workspace over recording fakes. Both lists are loaded; nothing is selected.
pub fn create_test_workspace(
    chats: Option<Vec<Chat>>,
    configs: Option<Vec<AssistantConfig>>,
) -> (TestWorkspace, Journal) {
    let journal = new_journal();
    let workspace = Workspace::new(
        FakeChatStore::new(chats, journal.clone()),
        FakeConfigStore::new(configs, journal.clone()),
        FakeStreamEngine::new(journal.clone()),
    );
    (workspace, journal)
}

pub fn test_backend(base_url: &str) -> Backend {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test client should build");
    Backend::new(client, base_url, "test-user")
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn event_stream(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/event-stream; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn render(&self) -> String {
        let reason = if self.status < 400 { "OK" } else { "Error" };
        format!(
            "HTTP/1.1 {} {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            self.status,
            reason,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

async fn read_http_request(stream: &mut TcpStream) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let mut headers = Vec::new();
    let mut content_length = 0;
    for line in lines.filter(|line| !line.is_empty()) {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim().to_string();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
            }
            headers.push((name.to_string(), value));
        }
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(CapturedRequest {
        request_line,
        headers,
        body,
    })
}

/// Serve `responses` in order, one per connection, and record each request.
pub async fn spawn_http_responder(
    responses: Vec<CannedResponse>,
) -> (String, Arc<Mutex<Vec<CapturedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    let captured = Arc::new(Mutex::new(Vec::new()));
    let captured_for_server = Arc::clone(&captured);

    tokio::spawn(async move {
        for response in responses {
            let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
            let request = read_http_request(&mut stream).await?;
            captured_for_server.lock().await.push(request);
            stream
                .write_all(response.render().as_bytes())
                .await
                .map_err(|err| err.to_string())?;
            let _ = stream.shutdown().await;
        }
        Ok::<(), String>(())
    });

    (format!("http://{addr}"), captured)
}
