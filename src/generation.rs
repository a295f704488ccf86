//! Content generation through an OpenAI-compatible chat completion API.
//!
//! The [`CompletionBackend`] trait is the seam: the shipped [`OpenAiBackend`]
//! talks HTTP, tests plug in a canned backend. The free functions on top pick
//! prompts, classify what comes back, and clean it for storage.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::models::{ContentHint, ContentKind};
use crate::sanitize::sanitize_for_kind;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 2000;
pub const TITLE_MAX_TOKENS: u32 = 50;

// ============================================================================
// Backend Trait
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the assistant message text, untrimmed.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    fn model_name(&self) -> &str;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ============================================================================
// OpenAI Backend
// ============================================================================

pub struct OpenAiBackend {
    client: Client,
    config: GenerationConfig,
}

impl OpenAiBackend {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Generation backend: url={}, model={}", config.base_url, config.model);
        if config.api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; generation requests will be rejected upstream");
        }

        Ok(Self { client, config })
    }

    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.bearer_auth(api_key);
        }

        req.header("Content-Type", "application/json")
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        debug!(
            "Completing with model {}, prompt length: {}",
            self.config.model,
            request.user.len()
        );

        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .build_request("/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Generation(format!("API returned {}: {}", status, message)));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Generation("Response had no choices".to_string()))?;

        debug!("Completion finished, response length: {}", content.len());
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// ============================================================================
// Prompts
// ============================================================================

const AUTO_PROMPT: &str = "You are an AI assistant. Choose the format that best fits the user's request and produce only that content. Do not explain, give the content directly.";

const NOTE_PROMPT: &str = "You are a note-taking assistant. Write the information the user gives as a short, concise, clear note. Do not explain, write only the note.";

const TABLE_PROMPT: &str = "You are a table assistant. Build a markdown table for the user's request. Do not explain, give only the table. Format:
| Header 1 | Header 2 | Header 3 |
|----------|----------|----------|
| Value 1  | Value 2  | Value 3  |";

const LIST_PROMPT: &str = "You are a list assistant. Build a to-do list for the user's request. Start every item with \"- [ ]\". Do not explain, give only the list.";

const DIAGRAM_PROMPT: &str = "You are a Mermaid diagram expert. USE ONLY VALID, CONSISTENT MERMAID SYNTAX.

MANDATORY RULES:
1. Use only ASCII letters and digits (A-Z, a-z, 0-9) in identifiers and labels
2. Use the correct syntax for each diagram type
3. Keep node IDs simple (A, B, C, Start, End)
4. Keep labels short and clear
5. Every line must be well formed

VALID DIAGRAM TYPES:

flowchart TD
    Start[Start] --> Process[Do work]
    Process --> Decision{Check}
    Decision -->|Yes| Success[Done]
    Decision -->|No| Error[Failed]

OR:

graph LR
    A[Input] --> B[Process]
    B --> C[Output]

OR:

sequenceDiagram
    User->>System: Request
    System->>Database: Query
    Database->>System: Result
    System->>User: Response

Do not explain, give only the diagram code.";

const LINK_PROMPT: &str = r#"You are a link collection assistant. Organize the links the user gives as JSON:

{
  "links": [
    {
      "title": "Link title",
      "url": "https://example.com",
      "description": "Short description"
    }
  ]
}

Do not explain, give only the JSON."#;

const CHART_PROMPT: &str = r#"You are a Chart.js data expert. Build a Chart.js data structure for the user's request as JSON:

{
  "type": "bar",
  "title": "Chart title",
  "labels": ["January", "February", "March"],
  "datasets": [
    {
      "label": "Sales",
      "data": [12, 19, 3],
      "backgroundColor": "rgba(102, 126, 234, 0.8)"
    }
  ]
}

Supported types: bar, line, pie, doughnut
Do not explain, give only the JSON."#;

const FORM_PROMPT: &str = r#"You are a form design assistant. Build a form structure for the user's request as JSON:

{
  "title": "Form title",
  "fields": [
    { "type": "text", "label": "Name", "placeholder": "Your name", "required": true },
    { "type": "email", "label": "Email", "required": true },
    { "type": "textarea", "label": "Message", "rows": 4 },
    { "type": "select", "label": "Category", "options": ["Option 1", "Option 2"] },
    { "type": "radio", "label": "Size", "options": ["Small", "Medium", "Large"] },
    { "type": "checkbox", "label": "Interests", "options": ["Sports", "Music", "Technology"] }
  ]
}

Supported field types: text, email, number, textarea, select, radio, checkbox
Do not explain, give only the JSON."#;

const TITLE_PROMPT: &str =
    "You are a title assistant. Write a short title of 3-5 words. Write only the title.";

pub fn system_prompt(hint: ContentHint) -> &'static str {
    match hint {
        ContentHint::Auto => AUTO_PROMPT,
        ContentHint::Kind(ContentKind::Note) => NOTE_PROMPT,
        ContentHint::Kind(ContentKind::Table) => TABLE_PROMPT,
        ContentHint::Kind(ContentKind::List) => LIST_PROMPT,
        ContentHint::Kind(ContentKind::Diagram) => DIAGRAM_PROMPT,
        ContentHint::Kind(ContentKind::Link) => LINK_PROMPT,
        ContentHint::Kind(ContentKind::Chart) => CHART_PROMPT,
        ContentHint::Kind(ContentKind::Form) => FORM_PROMPT,
    }
}

fn edit_system_prompt(kind: ContentKind) -> String {
    let mut rules = vec![
        format!("Keep the original format ({})", kind),
        "Make only the requested changes".to_string(),
    ];
    if kind == ContentKind::Diagram {
        rules.push("Use only ASCII characters".to_string());
    }
    if kind.is_json() {
        rules.push("Keep the JSON structure".to_string());
    }
    rules.push("Do not explain, give the edited content".to_string());

    let numbered = rules
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {}", i + 1, rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a content editing assistant.\n\nRULES:\n{}\n\nORIGINAL CONTENT TYPE: {}",
        numbered, kind
    )
}

fn edit_user_prompt(original: &str, instruction: &str) -> String {
    format!(
        "Original content:\n{}\n\nEdit request:\n{}\n\nEdit the content and give only the edited content.",
        original, instruction
    )
}

// ============================================================================
// Operations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub content: String,
    pub kind: ContentKind,
    pub model: String,
}

/// Generates content for `prompt`, resolving `hint` to a concrete kind.
pub async fn generate_content(
    backend: &dyn CompletionBackend,
    prompt: &str,
    hint: ContentHint,
) -> Result<Generated> {
    let raw = backend
        .complete(CompletionRequest::new(system_prompt(hint), prompt))
        .await?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Generation("Model returned an empty response".to_string()));
    }

    let kind = classify(trimmed, hint);
    debug!("Generated {} content ({} requested)", kind, hint.as_str());

    Ok(Generated {
        content: sanitize_for_kind(trimmed, kind),
        kind,
        model: backend.model_name().to_string(),
    })
}

/// Short chat title for `prompt`. Never fails; falls back to the default title.
pub async fn generate_title(backend: &dyn CompletionBackend, prompt: &str) -> String {
    let request = CompletionRequest::new(TITLE_PROMPT, prompt).with_max_tokens(TITLE_MAX_TOKENS);
    match backend.complete(request).await {
        Ok(title) => {
            let title = title.trim().trim_matches('"').trim();
            if title.is_empty() {
                DEFAULT_CHAT_TITLE.to_string()
            } else {
                title.to_string()
            }
        }
        Err(e) => {
            warn!("Title generation failed: {}", e);
            DEFAULT_CHAT_TITLE.to_string()
        }
    }
}

/// Revises `original` per `instruction`. The kind never changes.
pub async fn edit_content(
    backend: &dyn CompletionBackend,
    original: &str,
    instruction: &str,
    kind: ContentKind,
) -> Result<String> {
    let raw = backend
        .complete(CompletionRequest::new(
            edit_system_prompt(kind),
            edit_user_prompt(original, instruction),
        ))
        .await?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Generation("Model returned an empty response".to_string()));
    }
    Ok(sanitize_for_kind(trimmed, kind))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records the requests it saw.
    pub(crate) struct MockBackend {
        responses: Mutex<VecDeque<Result<String>>>,
        pub requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockBackend {
        pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }
    }

    #[async_trait]
    impl CompletionBackend for MockBackend {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Generation("no canned response".into())))
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }
    }

    #[tokio::test]
    async fn test_auto_detects_and_cleans_diagram() {
        let backend = MockBackend::replying("```mermaid\ngraph LR\n  A[Giriş] --> B\n```\n");
        let generated = generate_content(&backend, "draw it", ContentHint::Auto).await.unwrap();
        assert_eq!(generated.kind, ContentKind::Diagram);
        assert_eq!(generated.content, "graph LR\n  A[Giris] --> B");
        assert_eq!(generated.model, "mock-model");

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].system, AUTO_PROMPT);
        assert_eq!(requests[0].max_tokens, MAX_TOKENS);
        assert_eq!(requests[0].temperature, TEMPERATURE);
    }

    #[tokio::test]
    async fn test_hint_overrides_detection() {
        let backend = MockBackend::replying("```json\n{\"links\": []}\n```");
        let hint = ContentHint::Kind(ContentKind::Link);
        let generated = generate_content(&backend, "links", hint).await.unwrap();
        assert_eq!(generated.kind, ContentKind::Link);
        assert_eq!(generated.content, "{\"links\": []}");
        assert_eq!(backend.requests.lock().unwrap()[0].system, LINK_PROMPT);
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let backend = MockBackend::new(vec![Err(Error::Generation("429".into()))]);
        let err = generate_content(&backend, "x", ContentHint::Auto).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_empty_response_is_error() {
        let backend = MockBackend::replying("   \n");
        assert!(generate_content(&backend, "x", ContentHint::Auto).await.is_err());
    }

    #[tokio::test]
    async fn test_title_falls_back_on_failure() {
        let backend = MockBackend::new(vec![Err(Error::Generation("down".into()))]);
        assert_eq!(generate_title(&backend, "hello").await, DEFAULT_CHAT_TITLE);

        let backend = MockBackend::replying("  \"Weekly Grocery Plan\"\n");
        assert_eq!(generate_title(&backend, "groceries").await, "Weekly Grocery Plan");
        assert_eq!(backend.requests.lock().unwrap()[0].max_tokens, TITLE_MAX_TOKENS);
    }

    #[tokio::test]
    async fn test_edit_keeps_kind_and_cleans() {
        let backend = MockBackend::replying("```\n{\"type\":\"line\",\"datasets\":[]}\n```");
        let edited = edit_content(&backend, "{}", "make it a line chart", ContentKind::Chart)
            .await
            .unwrap();
        assert_eq!(edited, "{\"type\":\"line\",\"datasets\":[]}");

        let requests = backend.requests.lock().unwrap();
        assert!(requests[0].system.contains("Keep the JSON structure"));
        assert!(requests[0].user.contains("make it a line chart"));
    }

    #[test]
    fn test_edit_prompt_rules_per_kind() {
        let diagram = edit_system_prompt(ContentKind::Diagram);
        assert!(diagram.contains("Use only ASCII characters"));
        assert!(!diagram.contains("JSON"));
        let note = edit_system_prompt(ContentKind::Note);
        assert!(note.contains("1. Keep the original format (note)"));
        assert!(note.contains("3. Do not explain"));
    }
}
