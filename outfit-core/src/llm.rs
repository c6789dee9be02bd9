//! Chat requests against a local model runtime.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::{
    Config,
    model::ChatMessage,
    tools::{ToolDescriptor, ToolInvocation},
};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request to model runtime failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model runtime responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected model runtime response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDescriptor>,
}

/// What the model answered with: text, or a request to run one or more tools.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    PlainText(String),
    ToolRequested { content: String, calls: Vec<ToolInvocation> },
}

impl ModelReply {
    /// `ToolRequested` only when at least one call is present.
    pub fn new(content: String, calls: Vec<ToolInvocation>) -> Self {
        if calls.is_empty() {
            Self::PlainText(content)
        } else {
            Self::ToolRequested { content, calls }
        }
    }

    pub fn tool_calls(&self) -> &[ToolInvocation] {
        match self {
            Self::PlainText(_) => &[],
            Self::ToolRequested { calls, .. } => calls,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::PlainText(content) | Self::ToolRequested { content, .. } => content,
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync + Debug {
    async fn chat(&self, request: ChatRequest) -> Result<ModelReply, ModelError>;
}

/// Ollama `/api/chat` client, non-streaming.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    host: String,
    http: Client,
}

impl OllamaClient {
    pub fn new(config: &Config) -> Self {
        Self { host: config.model.host.clone(), http: Client::new() }
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.host.trim_end_matches('/'), endpoint.trim_start_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDescriptor]>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Option<Vec<OllamaToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OllamaToolCall {
    function: ToolInvocation,
}

#[async_trait]
impl ChatModel for OllamaClient {
    #[instrument(skip(self, request), fields(model = %request.model, tools = request.tools.len()))]
    async fn chat(&self, request: ChatRequest) -> Result<ModelReply, ModelError> {
        let body = OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            tools: (!request.tools.is_empty()).then_some(request.tools.as_slice()),
        };

        debug!(messages = request.messages.len(), "Sending chat request");

        let res = self.http.post(self.api_url("chat")).json(&body).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Chat request failed");
            return Err(ModelError::Status { status, body });
        }

        let text = res.text().await?;
        let parsed: OllamaChatResponse = serde_json::from_str(&text)?;

        let calls: Vec<ToolInvocation> = parsed
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| call.function)
            .collect();

        Ok(ModelReply::new(parsed.message.content, calls))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tools::weather_tool;
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    /// Scripted model: answers with queued replies and records every request.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeModel {
        replies: Arc<Mutex<VecDeque<ModelReply>>>,
        requests: Arc<Mutex<Vec<ChatRequest>>>,
    }

    impl FakeModel {
        pub(crate) fn replying(replies: impl IntoIterator<Item = ModelReply>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into_iter().collect())),
                requests: Arc::default(),
            }
        }

        pub(crate) fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl ChatModel for FakeModel {
        async fn chat(&self, request: ChatRequest) -> Result<ModelReply, ModelError> {
            self.requests.lock().expect("lock").push(request);
            let reply = self.replies.lock().expect("lock").pop_front();
            Ok(reply.unwrap_or_else(|| ModelReply::PlainText(String::new())))
        }
    }

    #[test]
    fn reply_without_calls_is_plain_text() {
        let reply = ModelReply::new("hello".into(), Vec::new());
        assert_eq!(reply, ModelReply::PlainText("hello".into()));
        assert!(reply.tool_calls().is_empty());
    }

    #[test]
    fn reply_with_calls_keeps_order() {
        let calls = vec![
            ToolInvocation { name: "a".into(), arguments: Default::default() },
            ToolInvocation { name: "b".into(), arguments: Default::default() },
        ];
        let reply = ModelReply::new(String::new(), calls);

        let names: Vec<&str> = reply.tool_calls().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn api_url_joins_without_double_slash() {
        let client = OllamaClient { host: "http://localhost:11434/".into(), http: Client::new() };
        assert_eq!(client.api_url("/chat"), "http://localhost:11434/api/chat");
    }

    #[test]
    fn wire_request_omits_empty_tools() {
        let messages = [ChatMessage::user("hi")];
        let without = serde_json::to_value(OllamaChatRequest {
            model: "llama3.1",
            messages: &messages,
            stream: false,
            tools: None,
        })
        .expect("serializable");
        assert!(without.get("tools").is_none());
        assert_eq!(without["stream"], serde_json::json!(false));

        let tools = [weather_tool()];
        let with = serde_json::to_value(OllamaChatRequest {
            model: "llama3.1",
            messages: &messages,
            stream: false,
            tools: Some(&tools),
        })
        .expect("serializable");
        assert_eq!(with["tools"][0]["function"]["name"], "get_current_weather");
    }

    #[test]
    fn null_tool_calls_decode_as_none() {
        let parsed: OllamaChatResponse = serde_json::from_str(
            r#"{"model":"llama3.1","message":{"role":"assistant","content":"hi","tool_calls":null},"done":true}"#,
        )
        .expect("valid response");

        assert!(parsed.message.tool_calls.is_none());
        assert_eq!(parsed.message.content, "hi");
    }
}
