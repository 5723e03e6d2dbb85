use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponseDto {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageRequestModel {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageResponseDto {
    /// Base64 encoded image bytes as returned by the inference API.
    pub image_base64: String,
}
