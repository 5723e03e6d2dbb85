use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: i32 = 2048;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_IMAGE_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";
const IMAGE_PROMPT_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn text(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(text.into()),
        }
    }
}

/// One chat completion call as the proxy receives it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i32,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default)]
    pub response_format: Option<serde_json::Value>,
    #[serde(default = "default_caller")]
    pub caller: String,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> i32 {
    DEFAULT_MAX_TOKENS
}

fn default_top_p() -> f64 {
    DEFAULT_TOP_P
}

fn default_caller() -> String {
    "unknown".to_string()
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            response_format: None,
            caller: default_caller(),
        }
    }

    pub fn body(&self) -> ChatCompletionBody<'_> {
        ChatCompletionBody {
            model: &self.model,
            messages: &self.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            stream: false,
            response_format: self.response_format.as_ref(),
        }
    }
}

/// Wire body for `POST /v1/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f64,
    pub max_tokens: i32,
    pub top_p: f64,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<&'a serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatChoiceMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl ChatCompletion {
    /// Text of the first choice, empty when absent.
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .unwrap_or("")
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.finish_reason.as_deref())
    }
}

/// Plain-text view of a conversation, used only for call logs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptSummary {
    pub system_prompt: String,
    pub user_prompt_text: String,
    pub has_image: bool,
    pub image_size_bytes: i64,
}

/// The last system text wins; user and assistant text is concatenated.
/// Image size is the length of the last image URL (usually a data URL).
pub fn extract_prompt_text(messages: &[ChatMessage]) -> PromptSummary {
    let mut summary = PromptSummary::default();

    for message in messages {
        match &message.content {
            MessageContent::Text(text) => push_text(&mut summary, message.role, text),
            MessageContent::Parts(parts) => {
                for part in parts {
                    match part {
                        ContentPart::Text { text } if !text.is_empty() => {
                            push_text(&mut summary, message.role, text)
                        }
                        ContentPart::Text { .. } => {}
                        ContentPart::ImageUrl { image_url } if !image_url.url.is_empty() => {
                            summary.has_image = true;
                            summary.image_size_bytes = image_url.url.len() as i64;
                        }
                        ContentPart::ImageUrl { .. } => {}
                    }
                }
            }
        }
    }

    summary
}

fn push_text(summary: &mut PromptSummary, role: ChatRole, text: &str) {
    if role == ChatRole::System {
        summary.system_prompt = text.to_string();
    } else {
        summary.user_prompt_text.push_str(text);
    }
}

/// Wire body for `POST /v1/images/generations`.
#[derive(Debug, Serialize)]
pub struct ImageGenerationBody {
    pub model: String,
    pub prompt: String,
    pub n: u8,
    pub response_format: &'static str,
    pub size: &'static str,
}

impl ImageGenerationBody {
    pub fn new(prompt: &str) -> Self {
        Self {
            model: DEFAULT_IMAGE_MODEL.to_string(),
            prompt: truncate_chars(prompt, IMAGE_PROMPT_MAX_CHARS),
            n: 1,
            response_format: "b64_json",
            size: "1024x1024",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageDatum>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageDatum {
    pub b64_json: Option<String>,
}

impl ImageGenerationResponse {
    pub fn first_image(&self) -> Option<&str> {
        self.data
            .first()
            .and_then(|datum| datum.b64_json.as_deref())
            .filter(|b64| !b64.is_empty())
    }
}

/// Char-boundary safe prefix.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
