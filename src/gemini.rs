//! Gemini embedding and generation providers over the REST API.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::synthesis::GenerationProvider;

/// The default Gemini API base URL.
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default embedding model.
const DEFAULT_EMBED_MODEL: &str = "text-embedding-004";

/// The default dimensionality for `text-embedding-004`.
const DEFAULT_DIMENSIONS: usize = 768;

/// The default generation model.
const DEFAULT_GENERATE_MODEL: &str = "gemini-1.5-flash";

/// A client for the Gemini REST API implementing both [`EmbeddingProvider`]
/// and [`GenerationProvider`].
///
/// Uses `reqwest` to call `models/{model}:embedContent` and
/// `models/{model}:generateContent` directly.
///
/// # Configuration
///
/// - `embed_model` – defaults to `text-embedding-004` (768 dimensions).
/// - `generate_model` – defaults to `gemini-1.5-flash`.
/// - `api_key` – from the constructor or the `GEMINI_API_KEY` environment
///   variable.
///
/// # Example
///
/// ```rust,ignore
/// use docqa::gemini::GeminiClient;
///
/// let client = GeminiClient::new("AIza...")?;
/// let embedding = client.embed("hello world").await?;
/// ```
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    embed_model: String,
    generate_model: String,
    dimensions: usize,
}

impl GeminiClient {
    /// Create a new client with the given API key and default models.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(QaError::EmbeddingError {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.into(),
            embed_model: DEFAULT_EMBED_MODEL.into(),
            generate_model: DEFAULT_GENERATE_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new client using the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| QaError::EmbeddingError {
            provider: "Gemini".into(),
            message: "GEMINI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the embedding model and its dimensionality.
    pub fn with_embed_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.embed_model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set the generation model (e.g. `gemini-1.5-pro`).
    pub fn with_generate_model(mut self, model: impl Into<String>) -> Self {
        self.generate_model = model.into();
        self
    }

    /// Override the API base URL (for proxies or tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        model: &str,
        method: &str,
        body: &B,
    ) -> std::result::Result<R, String> {
        let url = format!("{}/models/{model}:{method}", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(format!("API returned {status}: {detail}"));
        }

        response.json().await.map_err(|e| format!("failed to parse response: {e}"))
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    content: Content<'a>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Provider implementations ───────────────────────────────────────

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding text");

        let request = EmbedRequest { content: Content { parts: vec![Part { text }] } };
        let response: EmbedResponse =
            self.post(&self.embed_model, "embedContent", &request).await.map_err(|message| {
                error!(provider = "Gemini", %message, "embedding request failed");
                QaError::EmbeddingError { provider: "Gemini".into(), message }
            })?;

        Ok(response.embedding.values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = "Gemini", prompt_len = prompt.len(), "generating answer");

        let request =
            GenerateRequest { contents: vec![Content { parts: vec![Part { text: prompt }] }] };
        let response: GenerateResponse = self
            .post(&self.generate_model, "generateContent", &request)
            .await
            .map_err(|message| {
                error!(provider = "Gemini", %message, "generation request failed");
                QaError::GenerationError { provider: "Gemini".into(), message }
            })?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(QaError::GenerationError {
                provider: "Gemini".into(),
                message: "API returned no candidates".into(),
            });
        }

        Ok(text)
    }
}
