use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};

pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://integrate.api.nvidia.com";

/// Status and raw body of one HTTP exchange with the inference API.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `Err` means no HTTP status was obtained (connect, TLS, read failures).
#[async_trait]
#[automock]
pub trait InferenceTransport {
    async fn post_chat(&self, body: String) -> Result<TransportResponse>;

    async fn post_image(&self, body: String) -> Result<TransportResponse>;
}

pub struct ReqwestInferenceTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ReqwestInferenceTransport {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn post_json(&self, path: &str, body: String) -> Result<TransportResponse> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;

        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl InferenceTransport for ReqwestInferenceTransport {
    async fn post_chat(&self, body: String) -> Result<TransportResponse> {
        self.post_json("/v1/chat/completions", body).await
    }

    async fn post_image(&self, body: String) -> Result<TransportResponse> {
        self.post_json("/v1/images/generations", body).await
    }
}
