use std::env;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Instruction used when a message arrives before any conversation was started.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful university teaching assistant. You help explain concepts but never give the direct answer to quizzes. Guide the student.";

pub const UNAVAILABLE_REPLY: &str = "Error: AI Service unavailable. Please check API Key.";
pub const CONNECTION_REPLY: &str =
    "Sorry, I'm having trouble connecting to the knowledge base right now.";
pub const EMPTY_REPLY: &str = "I couldn't generate a response.";

/// Turns kept after the system instruction; older ones are dropped first.
pub const MAX_HISTORY: usize = 40;

const MODERATION_INSTRUCTION: &str = "You are a content moderator. Reply with a JSON object {\"safe\": boolean, \"reason\": string} where reason is a short explanation when the text is unsafe.";

/// Verdict returned by the moderation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub safe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ModerationVerdict {
    #[must_use]
    pub fn safe() -> Self {
        Self {
            safe: true,
            reason: None,
        }
    }

    #[must_use]
    pub fn unsafe_because(reason: impl Into<String>) -> Self {
        Self {
            safe: false,
            reason: Some(reason.into()),
        }
    }
}

/// Conversational tutor and content moderation backend.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Drop the running conversation and start a new one under `system_instruction`.
    fn start_chat(&self, system_instruction: &str);

    /// Send one user turn and return the assistant's reply.
    ///
    /// # Errors
    ///
    /// Returns `ChatError` if the service is disabled, unreachable, or replies with nothing.
    async fn send_message(&self, text: &str) -> Result<String, ChatError>;

    /// Ask the backend whether `text` is fit to publish.
    ///
    /// # Errors
    ///
    /// Returns `ChatError` if the service is disabled, unreachable, or the verdict cannot be parsed.
    async fn validate_content(&self, text: &str) -> Result<ModerationVerdict, ChatError>;
}

/// Send a tutor message, turning failures into a reply the learner can read.
pub async fn tutor_reply(chat: &dyn ChatService, text: &str) -> String {
    match chat.send_message(text).await {
        Ok(reply) => reply,
        Err(ChatError::Disabled) => {
            tracing::warn!("tutor chat requested but no AI backend is configured");
            UNAVAILABLE_REPLY.to_string()
        }
        Err(ChatError::EmptyResponse) => EMPTY_REPLY.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "tutor chat failed");
            CONNECTION_REPLY.to_string()
        }
    }
}

/// Moderate `text`, treating an unreachable or confused moderator as approval.
pub async fn moderate(chat: &dyn ChatService, text: &str) -> ModerationVerdict {
    match chat.validate_content(text).await {
        Ok(verdict) => verdict,
        Err(ChatError::Disabled) => {
            tracing::debug!("moderation skipped, no AI backend configured");
            ModerationVerdict::safe()
        }
        Err(err) => {
            tracing::warn!(error = %err, "moderation failed, allowing content");
            ModerationVerdict::safe()
        }
    }
}

//
// ─── HTTP BACKEND ──────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl ChatConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            env::var("ATHENA_AI_API_KEY").ok(),
            env::var("ATHENA_AI_BASE_URL").ok(),
            env::var("ATHENA_AI_MODEL").ok(),
        )
    }

    fn from_values(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Option<Self> {
        let api_key = api_key?;
        if api_key.trim().is_empty() {
            return None;
        }
        Some(Self {
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".into()),
            api_key,
            model: model.unwrap_or_else(|| "gpt-4o-mini".into()),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// `ChatService` over an OpenAI-compatible `chat/completions` endpoint.
///
/// Keeps the running conversation so follow-up questions have context.
pub struct HttpChatService {
    client: Client,
    config: Option<ChatConfig>,
    history: Mutex<Vec<ChatMessage>>,
}

impl HttpChatService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ChatConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ChatConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
            history: Mutex::new(Vec::new()),
        }
    }

    /// A new conversation over the same HTTP client and backend.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            history: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn record_turn(&self, text: &str, reply: &str) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.is_empty() {
            history.push(ChatMessage::new("system", DEFAULT_INSTRUCTION));
        }
        history.push(ChatMessage::new("user", text));
        history.push(ChatMessage::new("assistant", reply));

        let excess = (history.len() - 1).saturating_sub(MAX_HISTORY);
        if excess > 0 {
            history.drain(1..=excess);
        }
    }

    fn snapshot_with(&self, text: &str) -> Vec<ChatMessage> {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.is_empty() {
            history.push(ChatMessage::new("system", DEFAULT_INSTRUCTION));
        }
        let mut messages = history.clone();
        messages.push(ChatMessage::new("user", text));
        messages
    }

    async fn complete(
        &self,
        config: &ChatConfig,
        messages: Vec<ChatMessage>,
        json: bool,
    ) -> Result<String, ChatError> {
        let payload = ChatRequest {
            model: config.model.clone(),
            messages,
            temperature: 0.2,
            response_format: json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(config.completions_url())
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ChatError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    fn start_chat(&self, system_instruction: &str) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.clear();
        history.push(ChatMessage::new("system", system_instruction));
    }

    async fn send_message(&self, text: &str) -> Result<String, ChatError> {
        let config = self.config.as_ref().ok_or(ChatError::Disabled)?;
        let messages = self.snapshot_with(text);
        let reply = self.complete(config, messages, false).await?;
        self.record_turn(text, &reply);
        Ok(reply)
    }

    async fn validate_content(&self, text: &str) -> Result<ModerationVerdict, ChatError> {
        let config = self.config.as_ref().ok_or(ChatError::Disabled)?;
        let messages = vec![
            ChatMessage::new("system", MODERATION_INSTRUCTION),
            ChatMessage::new(
                "user",
                &format!(
                    "Analyze the following text for offensive, unethical, hate speech, or harmful language. Text to analyze: \"{text}\""
                ),
            ),
        ];
        let raw = self.complete(config, messages, true).await?;
        parse_verdict(&raw)
    }
}

fn parse_verdict(raw: &str) -> Result<ModerationVerdict, ChatError> {
    serde_json::from_str(raw.trim()).map_err(|e| ChatError::Malformed(e.to_string()))
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn new(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_requires_non_blank_key() {
        assert!(ChatConfig::from_values(None, None, None).is_none());
        assert!(ChatConfig::from_values(Some("  ".into()), None, None).is_none());

        let cfg = ChatConfig::from_values(
            Some("k".into()),
            Some("http://localhost:8080/v1/".into()),
            None,
        )
        .unwrap();
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(
            cfg.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn verdict_parsing() {
        assert_eq!(
            parse_verdict(" {\"safe\": true} ").unwrap(),
            ModerationVerdict::safe()
        );
        assert_eq!(
            parse_verdict("{\"safe\": false, \"reason\": \"insult\"}").unwrap(),
            ModerationVerdict::unsafe_because("insult")
        );
        assert!(matches!(
            parse_verdict("maybe?"),
            Err(ChatError::Malformed(_))
        ));
    }

    #[test]
    fn start_chat_replaces_history() {
        let chat = HttpChatService::new(None);
        chat.start_chat("be brief");
        let messages = chat.snapshot_with("hi");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "be brief");
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn first_message_falls_back_to_default_instruction() {
        let chat = HttpChatService::new(None);
        let messages = chat.snapshot_with("hi");
        assert_eq!(messages[0].content, DEFAULT_INSTRUCTION);
    }

    #[test]
    fn history_keeps_instruction_and_recent_turns() {
        let chat = HttpChatService::new(None);
        chat.start_chat("be brief");
        for i in 0..MAX_HISTORY {
            chat.record_turn(&format!("q{i}"), &format!("a{i}"));
        }

        let history = chat.history.lock().unwrap();
        assert_eq!(history.len(), MAX_HISTORY + 1);
        assert_eq!(history[0].content, "be brief");
        assert_eq!(history[1].content, format!("q{}", MAX_HISTORY / 2));
        assert_eq!(history.last().unwrap().content, format!("a{}", MAX_HISTORY - 1));
    }

    #[test]
    fn forked_conversations_are_independent() {
        let first = HttpChatService::new(None);
        first.start_chat("tutor one");
        let second = first.fork();
        second.start_chat("tutor two");

        assert_eq!(first.snapshot_with("hi")[0].content, "tutor one");
        assert_eq!(second.snapshot_with("hi")[0].content, "tutor two");
    }

    #[tokio::test]
    async fn unconfigured_service_degrades_gracefully() {
        let chat = HttpChatService::new(None);
        assert!(!chat.enabled());
        assert!(matches!(
            chat.send_message("hello").await,
            Err(ChatError::Disabled)
        ));
        assert_eq!(tutor_reply(&chat, "hello").await, UNAVAILABLE_REPLY);
        assert_eq!(moderate(&chat, "anything").await, ModerationVerdict::safe());
    }
}
