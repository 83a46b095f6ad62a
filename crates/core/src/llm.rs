//! Language model clients.
//!
//! The pipeline talks to the model through [`LlmClient`]: one synchronous
//! call per run, no retries. [`GeminiClient`] is the production client;
//! [`CannedClient`] replays a stored reply for offline runs.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::fetch::read_source_file;
use crate::prompt::Prompt;
use crate::{NewsdeskError, Result};

pub trait LlmClient {
    fn name(&self) -> &str;

    /// Readiness check run before any network use (credentials and the like).
    fn check(&self) -> Result<()>;

    /// Sends the prompt and returns the raw text reply.
    fn complete(&self, prompt: &Prompt) -> Result<String>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Builds the client from settings. A missing key is reported by
    /// [`LlmClient::check`], not here.
    pub fn new(settings: &Settings, timeout: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| NewsdeskError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl LlmClient for GeminiClient {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn check(&self) -> Result<()> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(NewsdeskError::MissingApiKey),
        }
    }

    fn complete(&self, prompt: &Prompt) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(NewsdeskError::MissingApiKey)?;

        let request = GenerateRequest {
            system_instruction: Content { role: None, parts: vec![Part { text: &prompt.system }] },
            contents: vec![Content { role: Some("user"), parts: vec![Part { text: &prompt.user }] }],
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "calling model");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .map_err(|e| NewsdeskError::Generation(format!("request to {} failed: {}", self.name(), e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| NewsdeskError::Generation(format!("cannot read model reply: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(NewsdeskError::Generation(format!("model API answered {}: {}", status.as_u16(), message)));
        }

        let reply = reply_text(&body)?;
        tracing::debug!(reply_chars = reply.chars().count(), "model replied");
        Ok(reply)
    }
}

/// Pulls the text of the first candidate out of a `generateContent` reply.
fn reply_text(body: &str) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| NewsdeskError::Generation(format!("unexpected model reply: {}", e)))?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(NewsdeskError::Generation("model reply contained no text".to_string()));
    }
    Ok(text)
}

/// Returns the same reply for every prompt.
#[derive(Debug, Clone)]
pub struct CannedClient {
    reply: String,
}

impl CannedClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }

    /// Loads the reply from a text file.
    pub fn from_file(path: &Path) -> Result<Self> {
        read_source_file(path).map(Self::new)
    }
}

impl LlmClient for CannedClient {
    fn name(&self) -> &str {
        "canned"
    }

    fn check(&self) -> Result<()> {
        Ok(())
    }

    fn complete(&self, _prompt: &Prompt) -> Result<String> {
        Ok(self.reply.clone())
    }
}
