//! Generative-text API interaction.
//!
//! This module sends one summarization request per article to the Gemini
//! `generateContent` endpoint.
//!
//! # Architecture
//!
//! - [`Summarize`]: Core trait defining async summarization
//! - [`GeminiClient`]: `reqwest` implementation against the REST API
//! - [`build_prompt`]: The instruction sent with every article
//!
//! Each call is a single request/response with the transport's default
//! timeout. Failures are returned to the caller, which decides what the
//! record falls back to.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Trait for async summarization of one article.
pub trait Summarize {
    /// Summarize `body`, returning the trimmed model text.
    async fn summarize(&self, title: &str, body: &str) -> Result<String, Box<dyn Error>>;
}

/// Build the summarization instruction for one article.
pub fn build_prompt(title: &str, body: &str) -> String {
    format!(
        "あなたは、日本のローカルニュースの専門家AIです。次のニュース記事の本文を読み、**3行以内**で、日本の読者向けに簡潔かつ中立的なトーンで要約してください。\n\
         \n\
         タイトル: {title}\n\
         \n\
         本文:\n\
         ---\n\
         {body}\n\
         ---\n\
         要約（3行以内）："
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Concatenate the text parts of the first candidate.
fn response_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text = content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<String>();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Summarizer backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(client: Client, api_base: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base,
            urlencoding::encode(&self.model)
        )
    }
}

impl Summarize for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model, %title))]
    async fn summarize(&self, title: &str, body: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let prompt = build_prompt(title, body);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let raw = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| crate::utils::truncate_for_log(&raw, 200));
            warn!(status = status.as_u16(), elapsed_ms = dt.as_millis() as u64, %message, "API call failed");
            return Err(format!("generateContent returned {}: {}", status, message).into());
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&raw)?;
        let text = response_text(parsed).ok_or("generateContent returned no text")?;
        info!(elapsed_ms = dt.as_millis() as u64, chars = text.chars().count(), "Summary received");
        Ok(text)
    }
}
